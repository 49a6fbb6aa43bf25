//! Error types for directory operations.

use thiserror::Error;

/// Result type alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Error type for Active Directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No group with the given name exists in the groups container.
    #[error("Group not found: {name}")]
    GroupNotFound { name: String },

    /// No user with the given login exists in the people container.
    #[error("User not found: {login}")]
    UserNotFound { login: String },

    /// The target entry already exists (LDAP result code 68).
    #[error("Entry already exists: {dn}")]
    AlreadyExists { dn: String },

    /// The target entry does not exist (LDAP result code 32).
    #[error("No such entry: {dn}")]
    NoSuchEntry { dn: String },

    /// Simple bind was rejected (LDAP result code 49).
    #[error("Authentication failed: invalid bind credentials")]
    AuthenticationFailed,

    /// The directory server could not be reached.
    #[error("Failed to connect to directory at {url}: {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: ldap3::LdapError,
    },

    /// The server returned a non-success result code not covered above.
    #[error("Directory operation failed with code {rc}: {text}")]
    OperationFailed { rc: u32, text: String },

    /// Configuration was missing or inconsistent.
    #[error("Invalid directory configuration: {0}")]
    InvalidConfig(String),

    /// Protocol-level LDAP error.
    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),
}

impl DirectoryError {
    /// True when the error indicates the referenced entry is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::GroupNotFound { .. } | Self::UserNotFound { .. } | Self::NoSuchEntry { .. }
        )
    }
}
