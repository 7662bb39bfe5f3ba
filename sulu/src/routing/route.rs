// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PAGE_ENTITY_CLASS: &str = "page";
pub const HOMEPAGE_ENTITY_CLASS: &str = "homepage";

/// The content a route points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntity {
    pub class: String,
    pub id: String,
    /// Structure type of the entity, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl RouteEntity {
    pub fn page(id: impl Into<String>) -> Self {
        Self {
            class: PAGE_ENTITY_CLASS.to_string(),
            id: id.into(),
            template: None,
        }
    }

    pub fn homepage(id: impl Into<String>) -> Self {
        Self {
            class: HOMEPAGE_ENTITY_CLASS.to_string(),
            id: id.into(),
            template: None,
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn is_homepage(&self) -> bool {
        self.class == HOMEPAGE_ENTITY_CLASS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub path: String,
    pub locale: String,
    pub webspace: String,
    pub entity_class: String,
    pub entity_id: String,
    #[serde(default)]
    pub history: bool,
    /// Newer route a history route redirects to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub created: DateTime<Utc>,
}

impl Route {
    pub fn new(entity: &RouteEntity, path: &str, webspace: &str, locale: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.to_string(),
            locale: locale.to_string(),
            webspace: webspace.to_string(),
            entity_class: entity.class.clone(),
            entity_id: entity.id.clone(),
            history: false,
            target: None,
            template: entity.template.clone(),
            created: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.history
    }

    pub fn belongs_to(&self, entity: &RouteEntity) -> bool {
        self.entity_class == entity.class && self.entity_id == entity.id
    }

    fn in_scope(&self, webspace: &str, locale: &str) -> bool {
        self.webspace == webspace && self.locale == locale
    }
}

/// Every route of every webspace, as persisted in `routes.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteTable {
    pub fn find_by_path(&self, path: &str, webspace: &str, locale: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.in_scope(webspace, locale) && route.path == path)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }

    /// The active route of `entity_id`, regardless of entity class.
    pub fn find_active(&self, entity_id: &str, webspace: &str, locale: &str) -> Option<&Route> {
        self.routes.iter().find(|route| {
            route.is_active() && route.in_scope(webspace, locale) && route.entity_id == entity_id
        })
    }

    /// History routes redirecting to `target`, newest first.
    pub fn histories_of(&self, target: Uuid) -> Vec<&Route> {
        let mut histories: Vec<&Route> = self
            .routes
            .iter()
            .filter(|route| route.history && route.target == Some(target))
            .collect();
        histories.sort_by(|a, b| b.created.cmp(&a.created));
        histories
    }

    pub fn active_under(&self, prefix: &str, webspace: &str, locale: &str) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| {
                route.is_active()
                    && route.in_scope(webspace, locale)
                    && is_at_or_under(&route.path, prefix)
            })
            .collect()
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Route> {
        let index = self.routes.iter().position(|route| route.id == id)?;
        Some(self.routes.remove(index))
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Route> {
        self.routes.iter_mut().find(|route| route.id == id)
    }
}

pub fn is_at_or_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
