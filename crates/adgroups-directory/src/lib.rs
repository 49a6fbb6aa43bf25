//! Active Directory group operations over LDAP.
//!
//! This crate translates group-management actions (create, delete, list
//! members, add/remove members, nest groups) into LDAP operations against
//! an Active Directory deployment with two base containers: a people
//! subtree for user accounts and a groups subtree for security groups.
//!
//! Connections are short-lived: each operation binds, runs, and unbinds,
//! on success and failure alike. Nested group membership is resolved with
//! breadth-first traversal and an explicit visited set so cyclic nesting
//! terminates.

pub mod client;
pub mod config;
pub mod dn;
pub mod error;
pub mod ops;
pub mod schema;

pub use client::{DirectoryClient, Endpoint};
pub use config::{DirectoryConfig, EndpointConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use ops::{AdDirectory, GroupDirectory, GroupEntry, UserEntry};
