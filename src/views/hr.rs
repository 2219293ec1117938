use async_trait::async_trait;

use crate::AppShell;
use crate::error::ApiError;
use crate::models::EmployeeQuery;
use crate::router::{DataTable, LoadedView, ViewBody, ViewLoader};
use crate::views::users::{grid_columns, yes_no};

/// EmployeesView
///
/// The HR roster grid: first page of `/hr/employees`, unfiltered. Shares its
/// column set with the user directory.
pub struct EmployeesView;

#[async_trait]
impl ViewLoader for EmployeesView {
    fn title(&self) -> &str {
        "Employees"
    }

    async fn load(&self, shell: &AppShell) -> Result<LoadedView, ApiError> {
        let page = shell.hr().list_employees(&EmployeeQuery::default()).await?;

        let rows = page
            .items
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.code.clone().unwrap_or_default(),
                    e.first_name.clone(),
                    e.last_name.clone(),
                    e.email.clone().unwrap_or_default(),
                    yes_no(e.is_active),
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
