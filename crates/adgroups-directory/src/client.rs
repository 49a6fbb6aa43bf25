//! Thin wrapper around `ldap3` with per-operation connections.
//!
//! Every directory operation opens a fresh connection, performs a simple
//! bind, runs, and releases the connection. Callers hold a [`BoundLdap`]
//! and must call [`BoundLdap::release`] on every exit path; the ops layer
//! does this by capturing the operation result before releasing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry};
use tracing::{debug, warn};

use crate::config::{DirectoryConfig, EndpointConfig};
use crate::error::{DirectoryError, DirectoryResult};

/// Which of the two configured endpoints to bind against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Endpoint authorized to search the people subtree.
    People,
    /// Endpoint authorized to manage the groups subtree.
    Groups,
}

/// Factory for short-lived bound LDAP connections.
#[derive(Clone)]
pub struct DirectoryClient {
    config: Arc<DirectoryConfig>,
}

impl DirectoryClient {
    pub fn new(config: Arc<DirectoryConfig>) -> Self {
        Self { config }
    }

    fn endpoint_config(&self, endpoint: Endpoint) -> &EndpointConfig {
        match endpoint {
            Endpoint::People => &self.config.people,
            Endpoint::Groups => &self.config.groups,
        }
    }

    /// Connect to the given endpoint and perform a simple bind.
    pub async fn bind(&self, endpoint: Endpoint) -> DirectoryResult<BoundLdap> {
        let ep = self.endpoint_config(endpoint);

        debug!(url = %ep.url, "Connecting to directory server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(self.config.conn_timeout_secs));

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &ep.url)
            .await
            .map_err(|e| DirectoryError::ConnectionFailed {
                url: ep.url.clone(),
                source: e,
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        debug!(bind_dn = %ep.bind_dn, "Performing LDAP bind");

        let result = ldap
            .simple_bind(&ep.bind_dn, &ep.bind_password)
            .await
            .map_err(|e| DirectoryError::ConnectionFailed {
                url: ep.url.clone(),
                source: e,
            })?;

        if result.rc == 49 {
            return Err(DirectoryError::AuthenticationFailed);
        }
        if result.rc != 0 {
            return Err(DirectoryError::OperationFailed {
                rc: result.rc,
                text: result.text,
            });
        }

        Ok(BoundLdap { ldap })
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("people_url", &self.config.people.url)
            .field("groups_url", &self.config.groups.url)
            .finish()
    }
}

/// A bound LDAP connection scoped to a single operation.
pub struct BoundLdap {
    ldap: Ldap,
}

impl BoundLdap {
    /// Subtree search returning constructed entries.
    pub async fn search(
        &mut self,
        base: &str,
        filter: &str,
        attrs: &[&str],
    ) -> DirectoryResult<Vec<SearchEntry>> {
        debug!(base = %base, filter = %filter, "LDAP search");
        let (entries, _res) = self
            .ldap
            .search(base, Scope::Subtree, filter, attrs.to_vec())
            .await?
            .success()?;
        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }

    /// Add a new entry.
    pub async fn add(
        &mut self,
        dn: &str,
        attrs: Vec<(String, HashSet<String>)>,
    ) -> DirectoryResult<()> {
        let res = self.ldap.add(dn, attrs).await?;
        check_result(dn, res.rc, res.text)
    }

    /// Apply modifications to an entry.
    pub async fn modify(&mut self, dn: &str, mods: Vec<Mod<String>>) -> DirectoryResult<()> {
        let res = self.ldap.modify(dn, mods).await?;
        check_result(dn, res.rc, res.text)
    }

    /// Delete an entry.
    pub async fn delete(&mut self, dn: &str) -> DirectoryResult<()> {
        let res = self.ldap.delete(dn).await?;
        check_result(dn, res.rc, res.text)
    }

    /// Unbind and drop the connection. Unbind failures are logged, not
    /// propagated: the operation outcome has already been determined.
    pub async fn release(mut self) {
        if let Err(e) = self.ldap.unbind().await {
            warn!(error = %e, "Error during LDAP unbind");
        }
    }
}

/// Translate an LDAP result code into the error taxonomy.
fn check_result(dn: &str, rc: u32, text: String) -> DirectoryResult<()> {
    match rc {
        0 => Ok(()),
        32 => Err(DirectoryError::NoSuchEntry { dn: dn.to_string() }),
        49 => Err(DirectoryError::AuthenticationFailed),
        68 => Err(DirectoryError::AlreadyExists { dn: dn.to_string() }),
        rc => Err(DirectoryError::OperationFailed { rc, text }),
    }
}
