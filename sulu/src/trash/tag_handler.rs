// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::item::{RestoredResource, TrashItem};
use super::{TrashError, TrashItemHandler};
use crate::tags::{TAGS_RESOURCE_KEY, Tag, TagError, TagRepository};
use serde_json::{Map, Value};
use std::sync::Arc;

const TAGS_SECURITY_CONTEXT: &str = "sulu.settings.tags";

pub struct TagTrashItemHandler {
    tags: Arc<TagRepository>,
}

impl TagTrashItemHandler {
    pub fn new(tags: Arc<TagRepository>) -> Self {
        Self { tags }
    }

    pub fn store_tag(&self, tag: &Tag) -> Result<TrashItem, TrashError> {
        let restore_data = match serde_json::to_value(tag) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(err) => return Err(TrashError::InvalidData(err.to_string())),
        };
        Ok(
            TrashItem::new(TAGS_RESOURCE_KEY, tag.id.to_string(), &tag.name, restore_data)
                .with_security_context(TAGS_SECURITY_CONTEXT),
        )
    }
}

fn parse_id(resource_id: &str) -> Result<u64, TrashError> {
    resource_id
        .parse()
        .map_err(|_| TrashError::NotFound(format!("tag {}", resource_id)))
}

fn map_tag_error(err: TagError) -> TrashError {
    match err {
        TagError::NotFound(id) => TrashError::NotFound(format!("tag {}", id)),
        TagError::Conflict(msg) => TrashError::Conflict(msg),
        TagError::InvalidName(msg) => TrashError::InvalidData(msg),
        TagError::InvalidId(id) => TrashError::InvalidData(format!("tag id {} is out of range", id)),
        TagError::Storage(msg) => TrashError::Storage(msg),
    }
}

impl TrashItemHandler for TagTrashItemHandler {
    fn resource_key(&self) -> &'static str {
        TAGS_RESOURCE_KEY
    }

    fn store(&self, resource_id: &str) -> Result<TrashItem, TrashError> {
        let id = parse_id(resource_id)?;
        let tag = self
            .tags
            .get(id)
            .ok_or_else(|| TrashError::NotFound(format!("tag {}", id)))?;
        self.store_tag(&tag)
    }

    fn remove(&self, resource_id: &str) -> Result<(), TrashError> {
        let id = parse_id(resource_id)?;
        self.tags.remove(id).map(|_| ()).map_err(map_tag_error)
    }

    fn restore(&self, item: &TrashItem) -> Result<RestoredResource, TrashError> {
        let tag: Tag = serde_json::from_value(Value::Object(item.restore_data.clone()))
            .map_err(|err| TrashError::InvalidData(err.to_string()))?;
        let tag = self.tags.insert(tag).map_err(map_tag_error)?;
        Ok(RestoredResource {
            resource_key: TAGS_RESOURCE_KEY.to_string(),
            resource_id: tag.id.to_string(),
            title: tag.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_keeps_tag_identity() {
        let tags = Arc::new(TagRepository::in_memory());
        let tag = tags.create("News").unwrap();
        let handler = TagTrashItemHandler::new(tags.clone());

        let item = handler.store(&tag.id.to_string()).unwrap();
        assert_eq!(item.resource_key, "tags");
        assert_eq!(item.restore_data["id"], 1);
        assert_eq!(item.restore_data["name"], "News");
        assert_eq!(item.resource_security_context.as_deref(), Some("sulu.settings.tags"));
        // Store alone leaves the tag in place.
        assert!(tags.get(tag.id).is_some());
    }

    #[test]
    fn restore_rejects_taken_id() {
        let tags = Arc::new(TagRepository::in_memory());
        let tag = tags.create("News").unwrap();
        let handler = TagTrashItemHandler::new(tags.clone());
        let item = handler.store_tag(&tag).unwrap();

        assert!(matches!(handler.restore(&item), Err(TrashError::Conflict(_))));
    }

    #[test]
    fn restore_rejects_out_of_range_id() {
        let tags = Arc::new(TagRepository::in_memory());
        let handler = TagTrashItemHandler::new(tags.clone());
        let mut data = Map::new();
        data.insert("id".to_string(), Value::from(u64::MAX));
        data.insert("name".to_string(), Value::from("News"));
        data.insert("created".to_string(), Value::from("2026-01-01T00:00:00Z"));
        data.insert("changed".to_string(), Value::from("2026-01-01T00:00:00Z"));
        let item = TrashItem::new("tags", u64::MAX.to_string(), "News", data);

        assert!(matches!(handler.restore(&item), Err(TrashError::InvalidData(_))));
        assert!(tags.list().is_empty());
        assert!(tags.create("News").is_ok());
    }

    #[test]
    fn restore_rejects_broken_data() {
        let handler = TagTrashItemHandler::new(Arc::new(TagRepository::in_memory()));
        let item = TrashItem::new("tags", "1", "x", Map::new());
        assert!(matches!(handler.restore(&item), Err(TrashError::InvalidData(_))));
    }
}
