//! Directory connection and container configuration.

use serde::Deserialize;

use crate::error::{DirectoryError, DirectoryResult};

fn default_conn_timeout_secs() -> u64 {
    10
}

/// A single directory endpoint with its bind credentials.
///
/// The service talks to two endpoints: one authorized to read the people
/// subtree and one authorized to manage the groups subtree. They may point
/// at the same server with different service accounts.
#[derive(Clone, Deserialize)]
pub struct EndpointConfig {
    /// LDAP URL, e.g. `ldaps://ad.example.com:636`.
    pub url: String,

    /// DN of the service account used for simple bind.
    pub bind_dn: String,

    /// Password for the service account.
    pub bind_password: String,
}

// Custom Debug to prevent password leakage in logs
impl std::fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("url", &self.url)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"***")
            .finish()
    }
}

impl EndpointConfig {
    fn validate(&self, label: &str) -> DirectoryResult<()> {
        if self.url.is_empty() {
            return Err(DirectoryError::InvalidConfig(format!(
                "{label} endpoint URL is required"
            )));
        }
        if !self.url.starts_with("ldap://") && !self.url.starts_with("ldaps://") {
            return Err(DirectoryError::InvalidConfig(format!(
                "{label} endpoint URL must start with ldap:// or ldaps://"
            )));
        }
        if self.bind_dn.is_empty() {
            return Err(DirectoryError::InvalidConfig(format!(
                "{label} bind DN is required"
            )));
        }
        Ok(())
    }
}

/// Configuration for Active Directory group management.
#[derive(Clone, Debug, Deserialize)]
pub struct DirectoryConfig {
    /// Endpoint authorized to search the people subtree.
    pub people: EndpointConfig,

    /// Endpoint authorized to manage the groups subtree.
    pub groups: EndpointConfig,

    /// Base DN of the people subtree, e.g. `OU=People,DC=example,DC=com`.
    /// Member DNs under this base are classified as users.
    pub people_base: String,

    /// Base DN of the groups subtree.
    pub groups_base: String,

    /// OU under which new groups are created,
    /// e.g. `OU=Managed,OU=Groups,DC=example,DC=com`.
    pub group_ou: String,

    /// objectCategory DN stamped onto new groups. When absent the
    /// attribute is omitted and the server fills in its schema default.
    #[serde(default)]
    pub group_category: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_conn_timeout_secs")]
    pub conn_timeout_secs: u64,
}

impl DirectoryConfig {
    /// Validate the configuration, failing fast on missing pieces.
    pub fn validate(&self) -> DirectoryResult<()> {
        self.people.validate("people")?;
        self.groups.validate("groups")?;
        if self.people_base.is_empty() {
            return Err(DirectoryError::InvalidConfig(
                "people base DN is required".to_string(),
            ));
        }
        if self.groups_base.is_empty() {
            return Err(DirectoryError::InvalidConfig(
                "groups base DN is required".to_string(),
            ));
        }
        if self.group_ou.is_empty() {
            return Err(DirectoryError::InvalidConfig(
                "group creation OU is required".to_string(),
            ));
        }
        Ok(())
    }
}
