//! Request types for the group management API.

use serde::Deserialize;

use crate::error::ApiGroupsError;

/// Body for batch user add/remove: `{"users": ["login1", "login2"]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberList {
    pub users: Vec<String>,
}

impl MemberList {
    /// Reject empty or blank login lists before touching the directory.
    pub fn validate(&self) -> Result<(), ApiGroupsError> {
        if self.users.is_empty() {
            return Err(ApiGroupsError::Validation(
                "users must not be empty".to_string(),
            ));
        }
        if self.users.iter().any(|login| login.trim().is_empty()) {
            return Err(ApiGroupsError::Validation(
                "users must not contain blank logins".to_string(),
            ));
        }
        Ok(())
    }
}
