// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod item;
pub mod manager;
pub mod tag_handler;

pub use item::{RestoredResource, TrashItem};
pub use manager::{TrashManager, TrashOutcome};
pub use tag_handler::TagTrashItemHandler;

use crate::store::StoreError;
use std::fmt;

/// Knows how to capture and bring back one kind of resource.
pub trait TrashItemHandler: Send + Sync {
    fn resource_key(&self) -> &'static str;

    /// Captures the live resource. Nothing is removed yet.
    fn store(&self, resource_id: &str) -> Result<TrashItem, TrashError>;

    /// Removes the live resource once it is captured.
    fn remove(&self, resource_id: &str) -> Result<(), TrashError>;

    fn restore(&self, item: &TrashItem) -> Result<RestoredResource, TrashError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashError {
    NotFound(String),
    UnknownResource(String),
    Conflict(String),
    InvalidData(String),
    Storage(String),
}

impl fmt::Display for TrashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrashError::NotFound(what) => write!(f, "Not found: {}", what),
            TrashError::UnknownResource(key) => {
                write!(f, "No trash handler for resource '{}'", key)
            }
            TrashError::Conflict(msg) => write!(f, "Cannot restore: {}", msg),
            TrashError::InvalidData(msg) => write!(f, "Invalid restore data: {}", msg),
            TrashError::Storage(msg) => write!(f, "Trash storage error: {}", msg),
        }
    }
}

impl std::error::Error for TrashError {}

impl From<StoreError> for TrashError {
    fn from(err: StoreError) -> Self {
        TrashError::Storage(err.message().to_string())
    }
}
