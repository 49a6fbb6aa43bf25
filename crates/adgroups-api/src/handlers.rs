//! Request handlers for the group management API.

use std::sync::Arc;

use adgroups_directory::GroupDirectory;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use tracing::info;

use crate::error::ApiGroupsError;
use crate::models::MemberList;

/// `POST /{group}` — create a universal security group.
pub async fn create_group_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
) -> Result<StatusCode, ApiGroupsError> {
    info!(group = %group, "Creating group");
    directory.create_group(&group).await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /{group}` — delete a group.
pub async fn delete_group_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
) -> Result<StatusCode, ApiGroupsError> {
    info!(group = %group, "Deleting group");
    directory.delete_group(&group).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /{group}` — flattened member DNs, one per line.
pub async fn list_members_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
) -> Result<String, ApiGroupsError> {
    let members = directory.members_of_group(&group).await?;
    Ok(members.join("\n"))
}

/// `GET /{group}/emails` — `mail displayName` per member, one per line.
pub async fn list_emails_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
) -> Result<String, ApiGroupsError> {
    let emails = directory.emails_for_group(&group).await?;
    Ok(emails.join("\n"))
}

/// `PUT /{group}/sam/{sam}` — nest group `sam` under `group`.
pub async fn nest_group_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path((group, sam)): Path<(String, String)>,
) -> Result<StatusCode, ApiGroupsError> {
    info!(parent = %group, child = %sam, "Nesting group");
    directory.add_group_to_group(&sam, &group).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /{group}/users` — add users by login.
pub async fn add_users_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
    Json(body): Json<MemberList>,
) -> Result<StatusCode, ApiGroupsError> {
    body.validate()?;
    info!(group = %group, count = body.users.len(), "Adding users to group");
    directory.add_users_to_group(&body.users, &group).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /{group}/users` — remove users by login.
pub async fn remove_users_handler(
    Extension(directory): Extension<Arc<dyn GroupDirectory>>,
    Path(group): Path<String>,
    Json(body): Json<MemberList>,
) -> Result<StatusCode, ApiGroupsError> {
    body.validate()?;
    info!(group = %group, count = body.users.len(), "Removing users from group");
    directory
        .remove_users_from_group(&body.users, &group)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
