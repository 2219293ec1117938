//! Endpoint Wrapper Index
//!
//! Organizes the typed endpoint facades by backend blueprint. Each facade is a
//! cheap handle over the shared services (constructed on demand by the
//! AppShell accessors) and owns no state of its own; every call runs through
//! the request pipeline and inherits its header injection, loading gauge, and
//! error classification.

/// Sign-in, sign-out, and identity hydration (`/auth/*`).
pub mod auth;

/// The user directory (`/users/*`).
pub mod users;

/// Module/tab administration and the issue tracker (`/admin/*`).
pub mod admin;

/// HR employee records (`/hr/*`).
pub mod hr;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use hr::HrApi;
pub use users::UsersApi;
