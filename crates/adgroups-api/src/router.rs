//! Group management router configuration.
//!
//! Routes (mounted under a `/groups` prefix by the server):
//! - POST /:group - Create group
//! - GET /:group - List flattened member DNs (text/plain)
//! - DELETE /:group - Delete group
//! - GET /:group/emails - List member e-mail lines (text/plain)
//! - PUT /:group/sam/:sam - Nest group :sam under :group
//! - PUT /:group/users - Add users from JSON body
//! - DELETE /:group/users - Remove users from JSON body

use std::sync::Arc;

use adgroups_directory::GroupDirectory;
use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{
    add_users_handler, create_group_handler, delete_group_handler, list_emails_handler,
    list_members_handler, nest_group_handler, remove_users_handler,
};

/// Create the group management router over a directory backend.
pub fn groups_router(directory: Arc<dyn GroupDirectory>) -> Router {
    Router::new()
        .route(
            "/:group",
            get(list_members_handler)
                .post(create_group_handler)
                .delete(delete_group_handler),
        )
        .route("/:group/emails", get(list_emails_handler))
        .route("/:group/sam/:sam", put(nest_group_handler))
        .route(
            "/:group/users",
            put(add_users_handler).delete(remove_users_handler),
        )
        .layer(axum::Extension(directory))
}
