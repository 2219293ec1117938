use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{DeleteAck, Employee, EmployeeCreate, EmployeeQuery, EmployeeUpdate, Page};
use crate::pipeline::ApiClient;

/// HrApi
///
/// Employee record endpoints.
pub struct HrApi {
    client: Arc<ApiClient>,
}

impl HrApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// list_employees
    ///
    /// GET /hr/employees with pagination, search, branch filter, and name
    /// ordering.
    pub async fn list_employees(&self, query: &EmployeeQuery) -> Result<Page<Employee>, ApiError> {
        self.client
            .get_with_query("/hr/employees", query.to_pairs())
            .await
    }

    /// get_employee
    ///
    /// GET /hr/employees/{id}.
    pub async fn get_employee(&self, id: i64) -> Result<Employee, ApiError> {
        self.client.get(&format!("/hr/employees/{id}")).await
    }

    /// create_employee
    ///
    /// POST /hr/employees.
    pub async fn create_employee(&self, employee: &EmployeeCreate) -> Result<Employee, ApiError> {
        self.client.post("/hr/employees", employee).await
    }

    /// update_employee
    ///
    /// PATCH /hr/employees/{id}. Partial: only the provided fields change.
    pub async fn update_employee(
        &self,
        id: i64,
        patch: &EmployeeUpdate,
    ) -> Result<Employee, ApiError> {
        self.client
            .patch(&format!("/hr/employees/{id}"), patch)
            .await
    }

    /// delete_employee
    ///
    /// DELETE /hr/employees/{id}.
    pub async fn delete_employee(&self, id: i64) -> Result<DeleteAck, ApiError> {
        self.client.delete(&format!("/hr/employees/{id}")).await
    }
}
