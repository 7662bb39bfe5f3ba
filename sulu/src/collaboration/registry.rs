// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceRef {
    pub resource_key: String,
    pub id: String,
}

impl ResourceRef {
    pub fn new(resource_key: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_key: resource_key.into(),
            id: id.into(),
        }
    }
}

/// One user editing a resource through one connection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub connection_id: u32,
    pub user_id: String,
    pub username: String,
    pub started: DateTime<Utc>,
    #[serde(skip)]
    last_seen: Instant,
}

/// Who currently has which resource open. Advisory only.
pub struct CollaborationRegistry {
    entries: RwLock<BTreeMap<ResourceRef, BTreeMap<u32, Collaborator>>>,
    threshold: Duration,
}

impl CollaborationRegistry {
    pub fn new(threshold: Duration) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<ResourceRef, BTreeMap<u32, Collaborator>>) -> T,
    ) -> T {
        match self.entries.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Collaboration lock poisoned; recovering");
                self.entries.clear_poison();
                f(&mut poisoned.into_inner())
            }
        }
    }

    /// Registers the connection on the resource and returns everyone on it.
    pub fn enter(
        &self,
        resource: &ResourceRef,
        connection_id: u32,
        user_id: &str,
        username: &str,
    ) -> Vec<Collaborator> {
        self.enter_at(resource, connection_id, user_id, username, Instant::now())
    }

    fn enter_at(
        &self,
        resource: &ResourceRef,
        connection_id: u32,
        user_id: &str,
        username: &str,
        now: Instant,
    ) -> Vec<Collaborator> {
        self.with_entries(|entries| {
            let collaborators = entries.entry(resource.clone()).or_default();
            collaborators
                .entry(connection_id)
                .and_modify(|existing| existing.last_seen = now)
                .or_insert_with(|| Collaborator {
                    connection_id,
                    user_id: user_id.to_string(),
                    username: username.to_string(),
                    started: Utc::now(),
                    last_seen: now,
                });
            prune(entries, self.threshold, now);
            listed(entries, resource)
        })
    }

    /// Keep-alive. Re-enters when the entry already expired.
    pub fn update(
        &self,
        resource: &ResourceRef,
        connection_id: u32,
        user_id: &str,
        username: &str,
    ) -> Vec<Collaborator> {
        self.enter(resource, connection_id, user_id, username)
    }

    pub fn leave(&self, resource: &ResourceRef, connection_id: u32) -> Vec<Collaborator> {
        self.with_entries(|entries| {
            if let Some(collaborators) = entries.get_mut(resource) {
                collaborators.remove(&connection_id);
                if collaborators.is_empty() {
                    entries.remove(resource);
                }
            }
            listed(entries, resource)
        })
    }

    /// Drops every entry of a closed connection.
    pub fn leave_all(&self, connection_id: u32) {
        self.with_entries(|entries| {
            for collaborators in entries.values_mut() {
                collaborators.remove(&connection_id);
            }
            entries.retain(|_, collaborators| !collaborators.is_empty());
        });
    }

    pub fn list(&self, resource: &ResourceRef) -> Vec<Collaborator> {
        self.list_at(resource, Instant::now())
    }

    fn list_at(&self, resource: &ResourceRef, now: Instant) -> Vec<Collaborator> {
        self.with_entries(|entries| {
            prune(entries, self.threshold, now);
            listed(entries, resource)
        })
    }
}

fn prune(
    entries: &mut BTreeMap<ResourceRef, BTreeMap<u32, Collaborator>>,
    threshold: Duration,
    now: Instant,
) {
    for collaborators in entries.values_mut() {
        collaborators.retain(|_, collaborator| now.duration_since(collaborator.last_seen) < threshold);
    }
    entries.retain(|_, collaborators| !collaborators.is_empty());
}

/// Oldest first.
fn listed(
    entries: &BTreeMap<ResourceRef, BTreeMap<u32, Collaborator>>,
    resource: &ResourceRef,
) -> Vec<Collaborator> {
    let mut collaborators: Vec<Collaborator> = entries
        .get(resource)
        .map(|collaborators| collaborators.values().cloned().collect())
        .unwrap_or_default();
    collaborators.sort_by(|a, b| a.started.cmp(&b.started).then(a.connection_id.cmp(&b.connection_id)));
    collaborators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> ResourceRef {
        ResourceRef::new("pages", "123-abc")
    }

    #[test]
    fn enter_lists_every_connection_on_the_resource() {
        let registry = CollaborationRegistry::new(Duration::from_secs(60));
        registry.enter(&page(), 1, "1", "max");
        let listed = registry.enter(&page(), 2, "2", "erika");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].username, "max");

        let other = ResourceRef::new("pages", "other");
        assert!(registry.list(&other).is_empty());
    }

    #[test]
    fn leave_removes_only_that_connection() {
        let registry = CollaborationRegistry::new(Duration::from_secs(60));
        registry.enter(&page(), 1, "1", "max");
        registry.enter(&page(), 2, "2", "erika");
        let listed = registry.leave(&page(), 1);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].connection_id, 2);

        registry.leave_all(2);
        assert!(registry.list(&page()).is_empty());
    }

    #[test]
    fn stale_entries_expire_after_threshold() {
        let registry = CollaborationRegistry::new(Duration::from_secs(10));
        let start = Instant::now();
        registry.enter_at(&page(), 1, "1", "max", start);
        registry.enter_at(&page(), 2, "2", "erika", start + Duration::from_secs(8));

        let listed = registry.list_at(&page(), start + Duration::from_secs(12));
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "erika");
    }

    #[test]
    fn update_refreshes_last_seen() {
        let registry = CollaborationRegistry::new(Duration::from_secs(10));
        let start = Instant::now();
        registry.enter_at(&page(), 1, "1", "max", start);
        registry.enter_at(&page(), 1, "1", "max", start + Duration::from_secs(9));

        let listed = registry.list_at(&page(), start + Duration::from_secs(15));
        assert_eq!(listed.len(), 1);
    }
}
