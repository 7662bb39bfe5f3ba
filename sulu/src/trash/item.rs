// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A removed resource, with everything needed to bring it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashItem {
    pub id: Uuid,
    pub resource_key: String,
    pub resource_id: String,
    pub title: String,
    pub restore_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub restore_options: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_security_context: Option<String>,
    pub stored: DateTime<Utc>,
}

impl TrashItem {
    pub fn new(
        resource_key: impl Into<String>,
        resource_id: impl Into<String>,
        title: impl Into<String>,
        restore_data: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource_key: resource_key.into(),
            resource_id: resource_id.into(),
            title: title.into(),
            restore_data,
            restore_type: None,
            restore_options: BTreeMap::new(),
            resource_security_context: None,
            stored: Utc::now(),
        }
    }

    pub fn with_security_context(mut self, context: impl Into<String>) -> Self {
        self.resource_security_context = Some(context.into());
        self
    }
}

/// What a handler brought back from the trash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredResource {
    pub resource_key: String,
    pub resource_id: String,
    pub title: String,
}
