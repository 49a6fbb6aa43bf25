//! Group management operations against Active Directory.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use ldap3::{Mod, SearchEntry};
use tracing::{debug, info, instrument, warn};

use crate::client::{DirectoryClient, Endpoint};
use crate::config::DirectoryConfig;
use crate::dn::{cn_from_dn, dn_under_base, escape_dn_value, escape_filter_value};
use crate::error::{DirectoryError, DirectoryResult};
use crate::schema;

/// A group entry: its DN and direct member DNs.
///
/// A missing `member` attribute on the server side yields an empty
/// member list, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub dn: String,
    pub member_dns: Vec<String>,
}

/// A user entry resolved from a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub dn: String,
    pub mail: Option<String>,
    pub display_name: Option<String>,
}

impl UserEntry {
    /// `"<mail> <displayName>"`, with absent attributes rendered empty.
    #[must_use]
    pub fn email_line(&self) -> String {
        format!(
            "{} {}",
            self.mail.as_deref().unwrap_or_default(),
            self.display_name.as_deref().unwrap_or_default()
        )
    }
}

/// The operations the HTTP layer needs from a directory backend.
///
/// [`AdDirectory`] is the live implementation; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Create a universal security group. Returns the new DN.
    async fn create_group(&self, name: &str) -> DirectoryResult<String>;

    /// Delete a group by name.
    async fn delete_group(&self, name: &str) -> DirectoryResult<()>;

    /// Flattened user DNs reachable through nested groups.
    async fn members_of_group(&self, name: &str) -> DirectoryResult<Vec<String>>;

    /// `"<mail> <displayName>"` per effective member.
    async fn emails_for_group(&self, name: &str) -> DirectoryResult<Vec<String>>;

    /// Add users (by login) to a group.
    async fn add_users_to_group(&self, logins: &[String], name: &str) -> DirectoryResult<()>;

    /// Remove users (by login) from a group.
    async fn remove_users_from_group(&self, logins: &[String], name: &str) -> DirectoryResult<()>;

    /// Nest the `child` group under the `parent` group.
    async fn add_group_to_group(&self, child: &str, parent: &str) -> DirectoryResult<()>;
}

/// Lookup seam for nested-group traversal.
///
/// Splitting the lookup from the traversal keeps [`expand_members`]
/// testable without a directory server.
#[async_trait]
pub trait GroupLookup: Send + Sync {
    /// Look up a group by name; `Ok(None)` when it does not exist.
    async fn lookup_group(&self, name: &str) -> DirectoryResult<Option<GroupEntry>>;
}

/// Resolve nested group membership using BFS with cycle detection.
///
/// Member DNs under `people_base` are users and collected directly;
/// anything else is treated as a nested group and expanded through
/// `lookup`. A visited set keyed on lowercased DNs guards against
/// circular nesting, and a seen set de-duplicates users reachable via
/// multiple paths. Nested groups that cannot be resolved are logged and
/// skipped rather than failing the whole listing.
pub async fn expand_members<L: GroupLookup + ?Sized>(
    lookup: &L,
    root: &GroupEntry,
    people_base: &str,
) -> DirectoryResult<Vec<String>> {
    let mut effective_members: Vec<String> = Vec::new();
    let mut seen_members: HashSet<String> = HashSet::new();
    let mut visited_groups: HashSet<String> = HashSet::new();
    let mut cycles_detected = 0usize;

    visited_groups.insert(root.dn.to_lowercase());

    let mut queue: VecDeque<String> = root.member_dns.iter().cloned().collect();

    while let Some(member_dn) = queue.pop_front() {
        let lower_dn = member_dn.to_lowercase();

        if dn_under_base(&member_dn, people_base) {
            if seen_members.insert(lower_dn) {
                effective_members.push(member_dn);
            }
            continue;
        }

        // Nested group: check for a cycle before expanding
        if visited_groups.contains(&lower_dn) {
            cycles_detected += 1;
            continue;
        }
        visited_groups.insert(lower_dn);

        let Some(cn) = cn_from_dn(&member_dn) else {
            warn!(dn = %member_dn, "Member DN has no CN component, skipping");
            continue;
        };

        match lookup.lookup_group(&cn).await? {
            Some(group) => queue.extend(group.member_dns.iter().cloned()),
            None => {
                warn!(dn = %member_dn, "Nested group could not be resolved, skipping");
            }
        }
    }

    if cycles_detected > 0 {
        warn!(
            cycles = cycles_detected,
            "Circular group nesting detected during resolution"
        );
    }
    debug!(
        effective_members = effective_members.len(),
        "Nested group resolution complete"
    );

    Ok(effective_members)
}

/// Live Active Directory backend.
#[derive(Clone, Debug)]
pub struct AdDirectory {
    client: DirectoryClient,
    config: Arc<DirectoryConfig>,
}

impl AdDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        let config = Arc::new(config);
        Self {
            client: DirectoryClient::new(config.clone()),
            config,
        }
    }

    fn first_attr(entry: &SearchEntry, name: &str) -> Option<String> {
        entry.attrs.get(name).and_then(|v| v.first()).cloned()
    }

    /// Resolve a login to its user entry in the people subtree.
    #[instrument(skip(self))]
    pub async fn find_user(&self, login: &str) -> DirectoryResult<UserEntry> {
        let filter = format!("(cn={})", escape_filter_value(login));

        let mut conn = self.client.bind(Endpoint::People).await?;
        let result = conn
            .search(&self.config.people_base, &filter, &["cn", "mail", "displayName"])
            .await;
        conn.release().await;

        let entry = result?
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::UserNotFound {
                login: login.to_string(),
            })?;

        Ok(UserEntry {
            mail: Self::first_attr(&entry, "mail"),
            display_name: Self::first_attr(&entry, "displayName"),
            dn: entry.dn,
        })
    }

    /// Resolve a group name to its entry in the groups subtree.
    #[instrument(skip(self))]
    pub async fn find_group(&self, name: &str) -> DirectoryResult<GroupEntry> {
        self.try_find_group(name)
            .await?
            .ok_or_else(|| DirectoryError::GroupNotFound {
                name: name.to_string(),
            })
    }

    async fn try_find_group(&self, name: &str) -> DirectoryResult<Option<GroupEntry>> {
        let filter = format!("(cn={})", escape_filter_value(name));

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn
            .search(&self.config.groups_base, &filter, &["cn", "member"])
            .await;
        conn.release().await;

        Ok(result?.into_iter().next().map(|entry| GroupEntry {
            member_dns: entry.attrs.get("member").cloned().unwrap_or_default(),
            dn: entry.dn,
        }))
    }

    /// Resolve logins to user entries in parallel.
    async fn find_users(&self, logins: &[String]) -> DirectoryResult<Vec<UserEntry>> {
        try_join_all(logins.iter().map(|login| self.find_user(login))).await
    }
}

#[async_trait]
impl GroupLookup for AdDirectory {
    async fn lookup_group(&self, name: &str) -> DirectoryResult<Option<GroupEntry>> {
        self.try_find_group(name).await
    }
}

#[async_trait]
impl GroupDirectory for AdDirectory {
    #[instrument(skip(self))]
    async fn create_group(&self, name: &str) -> DirectoryResult<String> {
        let cn = name.to_uppercase();
        let dn = format!("CN={},{}", escape_dn_value(&cn), self.config.group_ou);
        let attrs = schema::new_group_attributes(&cn, self.config.group_category.as_deref());

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn.add(&dn, attrs).await;
        conn.release().await;
        result?;

        info!(dn = %dn, "Group created");
        Ok(dn)
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, name: &str) -> DirectoryResult<()> {
        let group = self.find_group(name).await?;

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn.delete(&group.dn).await;
        conn.release().await;
        result?;

        info!(dn = %group.dn, "Group deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn members_of_group(&self, name: &str) -> DirectoryResult<Vec<String>> {
        let root = self.find_group(name).await?;
        expand_members(self, &root, &self.config.people_base).await
    }

    #[instrument(skip(self))]
    async fn emails_for_group(&self, name: &str) -> DirectoryResult<Vec<String>> {
        let member_dns = self.members_of_group(name).await?;
        let logins: Vec<String> = member_dns.iter().filter_map(|dn| cn_from_dn(dn)).collect();
        let users = self.find_users(&logins).await?;
        Ok(users.iter().map(UserEntry::email_line).collect())
    }

    #[instrument(skip(self, logins), fields(count = logins.len()))]
    async fn add_users_to_group(&self, logins: &[String], name: &str) -> DirectoryResult<()> {
        let group = self.find_group(name).await?;
        let users = self.find_users(logins).await?;

        // One change per login, applied in a single modify request
        let mods: Vec<Mod<String>> = users
            .into_iter()
            .map(|user| Mod::Add("member".to_string(), HashSet::from([user.dn])))
            .collect();

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn.modify(&group.dn, mods).await;
        conn.release().await;
        result?;

        info!(dn = %group.dn, count = logins.len(), "Users added to group");
        Ok(())
    }

    #[instrument(skip(self, logins), fields(count = logins.len()))]
    async fn remove_users_from_group(&self, logins: &[String], name: &str) -> DirectoryResult<()> {
        let group = self.find_group(name).await?;
        let users = self.find_users(logins).await?;

        let mods: Vec<Mod<String>> = users
            .into_iter()
            .map(|user| Mod::Delete("member".to_string(), HashSet::from([user.dn])))
            .collect();

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn.modify(&group.dn, mods).await;
        conn.release().await;
        result?;

        info!(dn = %group.dn, count = logins.len(), "Users removed from group");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_group_to_group(&self, child: &str, parent: &str) -> DirectoryResult<()> {
        let child_group = self.find_group(child).await?;
        let parent_group = self.find_group(parent).await?;

        let mods = vec![Mod::Add(
            "member".to_string(),
            HashSet::from([child_group.dn.clone()]),
        )];

        let mut conn = self.client.bind(Endpoint::Groups).await?;
        let result = conn.modify(&parent_group.dn, mods).await;
        conn.release().await;
        result?;

        info!(
            child = %child_group.dn,
            parent = %parent_group.dn,
            "Group nested under parent"
        );
        Ok(())
    }
}
