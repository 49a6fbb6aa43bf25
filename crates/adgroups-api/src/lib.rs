//! HTTP API for Active Directory group management.
//!
//! Exposes group CRUD, flattened member listing, member e-mail
//! resolution, batch user add/remove, and group nesting over a
//! [`GroupDirectory`] backend. Errors surface as RFC 7807 problem
//! responses.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use adgroups_directory::GroupDirectory;
pub use error::{ApiGroupsError, ProblemDetails};
pub use models::MemberList;
pub use router::groups_router;
