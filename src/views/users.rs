use async_trait::async_trait;

use crate::AppShell;
use crate::error::ApiError;
use crate::models::ListQuery;
use crate::router::{DataTable, LoadedView, ViewBody, ViewLoader};

/// UsersView
///
/// The user directory grid: first page of `/users/`, server-side total. User
/// rows carry no `code`, so that column renders blank; it exists to keep the
/// directory grids column-compatible with the HR ones.
pub struct UsersView;

#[async_trait]
impl ViewLoader for UsersView {
    fn title(&self) -> &str {
        "Users"
    }

    async fn load(&self, shell: &AppShell) -> Result<LoadedView, ApiError> {
        let page = shell.users().list(&ListQuery::default()).await?;

        let rows = page
            .items
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    String::new(),
                    u.first_name.clone(),
                    u.last_name.clone(),
                    u.email.clone(),
                    yes_no(u.is_active.unwrap_or(false)),
                ]
            })
            .collect();

        Ok(LoadedView {
            title: self.title().to_string(),
            body: ViewBody::Table(DataTable {
                columns: grid_columns(),
                rows,
                total: page.total,
            }),
        })
    }
}

pub(crate) fn grid_columns() -> Vec<String> {
    ["ID", "Code", "First Name", "Last Name", "Email", "Active"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(crate) fn yes_no(active: bool) -> String {
    if active { "Yes" } else { "No" }.to_string()
}
