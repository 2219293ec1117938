//! Built-in views and the default route table.
//!
//! Each module's navigation lands here: the `index` tab of a module redirects
//! into its real first tab, and the named tabs map to grid views. Everything
//! is registered up front so a bad route table is a boot failure instead of a
//! blank screen at click time.

pub mod hr;
pub mod users;

use std::sync::Arc;

use crate::router::RegistryBuilder;

/// default_registry
///
/// The shipped route table. Callers extend the builder with their own entries
/// before building, or build it as-is for the stock portal.
pub fn default_registry() -> RegistryBuilder {
    RegistryBuilder::new()
        .tab_redirect("users", "index", "/app/users/users")
        .tab_view("users", "users", Arc::new(users::UsersView))
        .tab_redirect("hr", "index", "/app/hr/employees")
        .tab_view("hr", "employees", Arc::new(hr::EmployeesView))
}
