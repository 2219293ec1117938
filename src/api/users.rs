use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{ListQuery, MeResponse, Page, UserProfile};
use crate::pipeline::ApiClient;

/// UsersApi
///
/// The user directory endpoints.
pub struct UsersApi {
    client: Arc<ApiClient>,
}

impl UsersApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// me
    ///
    /// GET /users/me: the caller's profile plus their module summary.
    pub async fn me(&self) -> Result<MeResponse, ApiError> {
        self.client.get("/users/me").await
    }

    /// list
    ///
    /// GET /users/ with pagination and optional search.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<UserProfile>, ApiError> {
        self.client.get_with_query("/users/", query.to_pairs()).await
    }
}
