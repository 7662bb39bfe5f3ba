// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::item::{RestoredResource, TrashItem};
use super::{TrashError, TrashItemHandler};
use crate::events::{DomainEvent, EventDispatcher};
use crate::store::YamlFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum TrashOutcome<T> {
    Done(T),
    Canceled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TrashData {
    #[serde(default)]
    items: Vec<TrashItem>,
}

/// Trash items persisted in `trash.yaml`, with one handler per resource key.
pub struct TrashManager {
    data: RwLock<TrashData>,
    file: Option<YamlFile>,
    handlers: BTreeMap<String, Arc<dyn TrashItemHandler>>,
    events: Arc<EventDispatcher>,
}

impl TrashManager {
    pub fn open(trash_file: PathBuf, events: Arc<EventDispatcher>) -> Result<Self, TrashError> {
        let file = YamlFile::new(trash_file, "trash");
        let data: TrashData = file.read()?.unwrap_or_default();
        Ok(Self {
            data: RwLock::new(data),
            file: Some(file),
            handlers: BTreeMap::new(),
            events,
        })
    }

    pub fn in_memory(events: Arc<EventDispatcher>) -> Self {
        Self {
            data: RwLock::new(TrashData::default()),
            file: None,
            handlers: BTreeMap::new(),
            events,
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn TrashItemHandler>) -> Self {
        self.handlers
            .insert(handler.resource_key().to_string(), handler);
        self
    }

    fn handler(&self, resource_key: &str) -> Result<&Arc<dyn TrashItemHandler>, TrashError> {
        self.handlers
            .get(resource_key)
            .ok_or_else(|| TrashError::UnknownResource(resource_key.to_string()))
    }

    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut TrashData) -> Result<T, TrashError>,
    ) -> Result<T, TrashError> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Trash lock poisoned on write; recovering");
                self.data.clear_poison();
                poisoned.into_inner()
            }
        };
        let mut updated = guard.clone();
        let result = f(&mut updated)?;
        if let Some(file) = &self.file {
            file.write(&updated)?;
        }
        *guard = updated;
        Ok(result)
    }

    /// Newest first.
    pub fn list(&self) -> Vec<TrashItem> {
        let mut items = match self.data.read() {
            Ok(guard) => guard.items.clone(),
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Trash lock poisoned on read; recovering");
                poisoned.into_inner().items.clone()
            }
        };
        items.sort_by(|a, b| b.stored.cmp(&a.stored));
        items
    }

    pub fn get(&self, id: Uuid) -> Option<TrashItem> {
        self.list().into_iter().find(|item| item.id == id)
    }

    /// Captures the resource, removes it and keeps the capture in the trash.
    pub fn move_to_trash(
        &self,
        resource_key: &str,
        resource_id: &str,
    ) -> Result<TrashOutcome<TrashItem>, TrashError> {
        let handler = self.handler(resource_key)?.clone();
        let item = handler.store(resource_id)?;

        let event = DomainEvent::ResourceTrashed {
            trash_item_id: item.id,
            resource_key: item.resource_key.clone(),
            resource_id: item.resource_id.clone(),
            title: item.title.clone(),
        };
        if self.events.dispatch_before(event.clone()).is_canceled() {
            return Ok(TrashOutcome::Canceled);
        }

        self.with_write(|data| {
            data.items.push(item.clone());
            Ok(())
        })?;
        if let Err(err) = handler.remove(resource_id) {
            // Resource is still live; drop the capture again.
            self.with_write(|data| {
                data.items.retain(|stored| stored.id != item.id);
                Ok(())
            })?;
            return Err(err);
        }

        self.events.dispatch_after(&event);
        log::info!(
            "🗑️ Moved {} {} to trash as {}",
            resource_key,
            resource_id,
            item.id
        );
        Ok(TrashOutcome::Done(item))
    }

    /// Brings the resource back and drops the trash item.
    pub fn restore(&self, id: Uuid) -> Result<TrashOutcome<RestoredResource>, TrashError> {
        let item = self
            .get(id)
            .ok_or_else(|| TrashError::NotFound(format!("trash item {}", id)))?;
        let handler = self.handler(&item.resource_key)?.clone();

        let event = DomainEvent::TrashItemRestored {
            trash_item_id: item.id,
            resource_key: item.resource_key.clone(),
            resource_id: item.resource_id.clone(),
        };
        if self.events.dispatch_before(event.clone()).is_canceled() {
            return Ok(TrashOutcome::Canceled);
        }

        let restored = handler.restore(&item)?;
        if let Err(err) = self.with_write(|data| {
            data.items.retain(|stored| stored.id != id);
            Ok(())
        }) {
            // Trash item stays; take the resource back out so a retry can restore it.
            if let Err(rollback) = handler.remove(&item.resource_id) {
                log::error!(
                    "🚨 CRITICAL: Restored {} {} but could not drop trash item {} or roll back: {}",
                    item.resource_key,
                    item.resource_id,
                    id,
                    rollback
                );
            }
            return Err(err);
        }
        self.events.dispatch_after(&event);
        log::info!("♻️ Restored {} {} from trash", restored.resource_key, restored.resource_id);
        Ok(TrashOutcome::Done(restored))
    }

    /// Drops a trash item for good.
    pub fn purge(&self, id: Uuid) -> Result<TrashItem, TrashError> {
        self.with_write(|data| {
            let index = data
                .items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| TrashError::NotFound(format!("trash item {}", id)))?;
            Ok(data.items.remove(index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventEnvelope, EventListener};
    use crate::tags::TagRepository;
    use crate::trash::TagTrashItemHandler;
    use crate::util::test_fixtures::TestFixtureRoot;

    fn setup(events: Arc<EventDispatcher>) -> (Arc<TagRepository>, TrashManager) {
        let tags = Arc::new(TagRepository::in_memory());
        let trash = TrashManager::in_memory(events)
            .with_handler(Arc::new(TagTrashItemHandler::new(tags.clone())));
        (tags, trash)
    }

    #[test]
    fn tag_round_trips_through_trash() {
        let (tags, trash) = setup(Arc::new(EventDispatcher::new()));
        let tag = tags.create("News").unwrap();

        let TrashOutcome::Done(item) = trash.move_to_trash("tags", &tag.id.to_string()).unwrap()
        else {
            panic!("not canceled");
        };
        assert!(tags.get(tag.id).is_none());
        assert_eq!(item.title, "News");
        assert_eq!(trash.list().len(), 1);

        let outcome = trash.restore(item.id).unwrap();
        assert!(matches!(outcome, TrashOutcome::Done(_)));
        let restored = tags.get(tag.id).expect("restored tag");
        assert_eq!(restored.name, tag.name);
        assert_eq!(restored.created, tag.created);
        assert!(trash.list().is_empty());
    }

    #[test]
    fn restore_conflicts_when_name_is_taken() {
        let (tags, trash) = setup(Arc::new(EventDispatcher::new()));
        let tag = tags.create("News").unwrap();
        let TrashOutcome::Done(item) = trash.move_to_trash("tags", &tag.id.to_string()).unwrap()
        else {
            panic!("not canceled");
        };
        tags.create("news").unwrap();

        assert!(matches!(trash.restore(item.id), Err(TrashError::Conflict(_))));
        assert_eq!(trash.list().len(), 1);
    }

    #[test]
    fn unknown_resources_and_items_are_reported() {
        let (_, trash) = setup(Arc::new(EventDispatcher::new()));
        assert!(matches!(
            trash.move_to_trash("pages", "1"),
            Err(TrashError::UnknownResource(_))
        ));
        assert!(matches!(
            trash.move_to_trash("tags", "99"),
            Err(TrashError::NotFound(_))
        ));
        assert!(matches!(
            trash.restore(Uuid::new_v4()),
            Err(TrashError::NotFound(_))
        ));
    }

    struct KeepEverything;

    impl EventListener for KeepEverything {
        fn before(&self, envelope: &mut EventEnvelope) {
            envelope.cancel();
        }
    }

    #[test]
    fn canceled_trashing_keeps_resource() {
        let events = Arc::new(EventDispatcher::new());
        events.subscribe(Arc::new(KeepEverything));
        let (tags, trash) = setup(events);
        let tag = tags.create("News").unwrap();

        let outcome = trash.move_to_trash("tags", &tag.id.to_string()).unwrap();
        assert_eq!(outcome, TrashOutcome::Canceled);
        assert!(tags.get(tag.id).is_some());
        assert!(trash.list().is_empty());
    }

    #[test]
    fn failed_restore_keeps_resource_in_trash() {
        let fixture = TestFixtureRoot::new_unique("trash-restore-rollback").unwrap();
        let path = fixture.state_dir().join("trash.yaml");
        let tags = Arc::new(TagRepository::in_memory());
        let tag = tags.create("News").unwrap();
        let trash = TrashManager::open(path.clone(), Arc::new(EventDispatcher::new()))
            .unwrap()
            .with_handler(Arc::new(TagTrashItemHandler::new(tags.clone())));
        let TrashOutcome::Done(item) = trash.move_to_trash("tags", &tag.id.to_string()).unwrap()
        else {
            panic!("not canceled");
        };

        // A directory in place of the file makes the next write fail.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocked")).unwrap();

        assert!(matches!(trash.restore(item.id), Err(TrashError::Storage(_))));
        assert!(tags.get(tag.id).is_none());
        assert_eq!(trash.list().len(), 1);

        std::fs::remove_dir_all(&path).unwrap();
        assert!(matches!(trash.restore(item.id), Ok(TrashOutcome::Done(_))));
        assert!(tags.get(tag.id).is_some());
        assert!(trash.list().is_empty());
    }

    #[test]
    fn trash_persists_to_yaml() {
        let fixture = TestFixtureRoot::new_unique("trash-persist").unwrap();
        let path = fixture.state_dir().join("trash.yaml");
        let events = Arc::new(EventDispatcher::new());
        let tags = Arc::new(TagRepository::in_memory());
        let tag = tags.create("News").unwrap();
        let trash = TrashManager::open(path.clone(), events.clone())
            .unwrap()
            .with_handler(Arc::new(TagTrashItemHandler::new(tags.clone())));
        trash.move_to_trash("tags", &tag.id.to_string()).unwrap();

        let reopened = TrashManager::open(path, events).unwrap();
        let items = reopened.list();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].restore_data["name"], "News");
    }
}
