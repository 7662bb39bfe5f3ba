// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::store::{StoreError, YamlFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::RwLock;

pub const TAGS_RESOURCE_KEY: &str = "tags";
const MAX_TAG_NAME_CHARS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub created: DateTime<Utc>,
    pub changed: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    NotFound(u64),
    Conflict(String),
    InvalidName(String),
    /// Id outside the range new tags can be numbered from.
    InvalidId(u64),
    Storage(String),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::NotFound(id) => write!(f, "Tag {} not found", id),
            TagError::Conflict(msg) => write!(f, "Tag conflict: {}", msg),
            TagError::InvalidName(msg) => write!(f, "Invalid tag name: {}", msg),
            TagError::InvalidId(id) => write!(f, "Invalid tag id: {}", id),
            TagError::Storage(msg) => write!(f, "Tag storage error: {}", msg),
        }
    }
}

impl std::error::Error for TagError {}

impl From<StoreError> for TagError {
    fn from(err: StoreError) -> Self {
        TagError::Storage(err.message().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TagsData {
    #[serde(default = "first_tag_id")]
    next_id: u64,
    #[serde(default)]
    tags: Vec<Tag>,
}

impl Default for TagsData {
    fn default() -> Self {
        Self {
            next_id: first_tag_id(),
            tags: Vec::new(),
        }
    }
}

fn first_tag_id() -> u64 {
    1
}

/// Tags persisted in `tags.yaml`. Names are unique, compared case-insensitively.
pub struct TagRepository {
    data: RwLock<TagsData>,
    file: Option<YamlFile>,
}

impl TagRepository {
    pub fn open(tags_file: PathBuf) -> Result<Self, TagError> {
        let file = YamlFile::new(tags_file, "tags");
        let data: TagsData = file.read()?.unwrap_or_default();
        Ok(Self {
            data: RwLock::new(data),
            file: Some(file),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(TagsData::default()),
            file: None,
        }
    }

    fn with_read<T>(&self, f: impl FnOnce(&TagsData) -> T) -> T {
        match self.data.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Tags lock poisoned on read; recovering");
                f(&poisoned.into_inner())
            }
        }
    }

    /// Clones, mutates and persists before swapping the shared copy.
    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut TagsData) -> Result<T, TagError>,
    ) -> Result<T, TagError> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Tags lock poisoned on write; recovering");
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

    pub fn list(&self) -> Vec<Tag> {
        self.with_read(|data| data.tags.clone())
    }

    pub fn get(&self, id: u64) -> Option<Tag> {
        self.with_read(|data| data.tags.iter().find(|tag| tag.id == id).cloned())
    }

    pub fn find_by_name(&self, name: &str) -> Option<Tag> {
        self.with_read(|data| {
            data.tags
                .iter()
                .find(|tag| tag.name.eq_ignore_ascii_case(name.trim()))
                .cloned()
        })
    }

    pub fn create(&self, name: &str) -> Result<Tag, TagError> {
        let name = validate_name(name)?;
        self.with_write(|data| {
            ensure_name_free(data, &name, None)?;
            let now = Utc::now();
            let id = data.next_id;
            data.next_id = id.checked_add(1).ok_or(TagError::InvalidId(id))?;
            let tag = Tag {
                id,
                name,
                created: now,
                changed: now,
            };
            data.tags.push(tag.clone());
            Ok(tag)
        })
    }

    pub fn rename(&self, id: u64, name: &str) -> Result<Tag, TagError> {
        let name = validate_name(name)?;
        self.with_write(|data| {
            ensure_name_free(data, &name, Some(id))?;
            let tag = data
                .tags
                .iter_mut()
                .find(|tag| tag.id == id)
                .ok_or(TagError::NotFound(id))?;
            tag.name = name;
            tag.changed = Utc::now();
            Ok(tag.clone())
        })
    }

    pub fn remove(&self, id: u64) -> Result<Tag, TagError> {
        self.with_write(|data| {
            let index = data
                .tags
                .iter()
                .position(|tag| tag.id == id)
                .ok_or(TagError::NotFound(id))?;
            Ok(data.tags.remove(index))
        })
    }

    /// Puts back a tag with its original id and timestamps.
    pub fn insert(&self, tag: Tag) -> Result<Tag, TagError> {
        self.with_write(|data| {
            if data.tags.iter().any(|existing| existing.id == tag.id) {
                return Err(TagError::Conflict(format!("id {} is already used", tag.id)));
            }
            ensure_name_free(data, &tag.name, None)?;
            let after = tag.id.checked_add(1).ok_or(TagError::InvalidId(tag.id))?;
            data.next_id = data.next_id.max(after);
            data.tags.push(tag.clone());
            data.tags.sort_by_key(|tag| tag.id);
            Ok(tag)
        })
    }
}

fn validate_name(name: &str) -> Result<String, TagError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TagError::InvalidName("name must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TAG_NAME_CHARS {
        return Err(TagError::InvalidName(format!(
            "name exceeds {} characters",
            MAX_TAG_NAME_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

fn ensure_name_free(data: &TagsData, name: &str, except: Option<u64>) -> Result<(), TagError> {
    let taken = data
        .tags
        .iter()
        .any(|tag| Some(tag.id) != except && tag.name.eq_ignore_ascii_case(name));
    if taken {
        return Err(TagError::Conflict(format!(
            "a tag named '{}' already exists",
            name
        )));
    }
    Ok(())
}
