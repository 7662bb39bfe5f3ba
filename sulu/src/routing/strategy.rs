// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::RouteError;
use super::path_cleanup::PathCleanup;
use super::repository::RouteRepository;
use super::route::{Route, RouteEntity, RouteTable, is_at_or_under};
use crate::events::{DomainEvent, EventDispatcher};
use crate::hash::{check_hash, content_hash};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

const MAX_HISTORY_HOPS: usize = 32;
const MAX_UNIQUE_ATTEMPTS: u32 = 10_000;

/// Result of resolving a resource locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub route_id: Uuid,
    pub entity_class: String,
    pub entity_id: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Current path when `path` is a history route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    Created { route: Route },
    Renamed { route: Route, previous_path: String },
    Unchanged { route: Route },
    Canceled,
}

impl SaveOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            SaveOutcome::Created { route }
            | SaveOutcome::Renamed { route, .. }
            | SaveOutcome::Unchanged { route } => Some(route),
            SaveOutcome::Canceled => None,
        }
    }
}

/// Result of writes touching several routes at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum BatchOutcome {
    Applied(usize),
    Canceled,
}

/// Maps resource locators to entities and back, keeping renamed paths as history.
///
/// Every write runs lookup, event dispatch and persistence under one write lock,
/// so the one-active-route rule holds within the process. The table is cloned,
/// changed and persisted before it replaces the shared copy.
pub struct ResourceLocatorStrategy {
    routes: RwLock<RouteTable>,
    repository: Arc<dyn RouteRepository>,
    cleanup: PathCleanup,
    events: Arc<EventDispatcher>,
}

impl ResourceLocatorStrategy {
    pub fn new(
        repository: Arc<dyn RouteRepository>,
        cleanup: PathCleanup,
        events: Arc<EventDispatcher>,
    ) -> Result<Self, RouteError> {
        let table = repository.load()?;
        log::debug!("Loaded {} route(s)", table.routes.len());
        Ok(Self {
            routes: RwLock::new(table),
            repository,
            cleanup,
            events,
        })
    }

    fn with_routes_read<T>(
        &self,
        f: impl FnOnce(&RouteTable) -> Result<T, RouteError>,
    ) -> Result<T, RouteError> {
        if let Ok(guard) = self.routes.read() {
            return f(&guard);
        }
        log::error!("🚨 CRITICAL: Route table lock poisoned on read; reloading from disk");
        self.reload()?;
        let guard = self.routes.read().map_err(|_| {
            RouteError::Storage("Route table lock poisoned after recovery".to_string())
        })?;
        f(&guard)
    }

    fn with_routes_write<T>(
        &self,
        f: impl FnOnce(&mut RouteTable) -> Result<T, RouteError>,
    ) -> Result<T, RouteError> {
        let mut guard = match self.routes.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Route table lock poisoned on write; reloading from disk");
                let mut guard = poisoned.into_inner();
                *guard = self.repository.load()?;
                self.routes.clear_poison();
                guard
            }
        };
        f(&mut guard)
    }

    fn reload(&self) -> Result<(), RouteError> {
        let table = self.repository.load()?;
        match self.routes.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
        self.routes.clear_poison();
        Ok(())
    }

    pub fn load_by_resource_locator(
        &self,
        path: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<ResolvedRoute, RouteError> {
        self.with_routes_read(|table| {
            let route = table
                .find_by_path(path, webspace, locale)
                .ok_or_else(|| RouteError::NotFound(format!("{} ({}, {})", path, webspace, locale)))?;
            if route.is_active() {
                return Ok(resolved(route, None));
            }

            let mut current = route;
            for _ in 0..MAX_HISTORY_HOPS {
                let Some(target) = current.target.and_then(|id| table.find_by_id(id)) else {
                    break;
                };
                if target.is_active() {
                    return Ok(resolved(route, Some(target.path.clone())));
                }
                current = target;
            }
            Err(RouteError::NotFound(format!(
                "{} ({}, {}) is a history route without an active target",
                path, webspace, locale
            )))
        })
    }

    /// Active route of the entity.
    pub fn load_by_content_uuid(
        &self,
        entity_id: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<Route, RouteError> {
        self.with_routes_read(|table| {
            table
                .find_active(entity_id, webspace, locale)
                .cloned()
                .ok_or_else(|| {
                    RouteError::NotFound(format!("entity {} ({}, {})", entity_id, webspace, locale))
                })
        })
    }

    /// History routes of the entity, newest first.
    pub fn load_history_by_content_uuid(
        &self,
        entity_id: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<Vec<Route>, RouteError> {
        self.with_routes_read(|table| {
            let mut histories: Vec<Route> = table
                .routes
                .iter()
                .filter(|route| {
                    route.history
                        && route.entity_id == entity_id
                        && route.webspace == webspace
                        && route.locale == locale
                })
                .cloned()
                .collect();
            histories.sort_by(|a, b| b.created.cmp(&a.created));
            Ok(histories)
        })
    }

    pub fn save(
        &self,
        entity: &RouteEntity,
        path: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<SaveOutcome, RouteError> {
        self.save_with(entity, path, webspace, locale, None)
    }

    /// `save` that first compares `client_hash` with the hash of the active route.
    ///
    /// The comparison runs under the same write lock as the save, so two writers
    /// holding the same hash cannot both succeed.
    pub fn save_checked(
        &self,
        entity: &RouteEntity,
        path: &str,
        webspace: &str,
        locale: &str,
        client_hash: Option<&str>,
        force: bool,
    ) -> Result<SaveOutcome, RouteError> {
        self.save_with(entity, path, webspace, locale, Some((client_hash, force)))
    }

    fn save_with(
        &self,
        entity: &RouteEntity,
        path: &str,
        webspace: &str,
        locale: &str,
        hash_check: Option<(Option<&str>, bool)>,
    ) -> Result<SaveOutcome, RouteError> {
        validate_path(entity, path)?;

        let (outcome, event) = self.with_routes_write(|table| {
            if let Some((client_hash, force)) = hash_check
                && let Some(current) = table.find_active(&entity.id, webspace, locale)
            {
                let current_hash = content_hash(current)?;
                check_hash(client_hash, &current_hash, force)?;
            }
            if let Some(current) = table.find_active(&entity.id, webspace, locale)
                && current.path == path
            {
                if entity.template.is_none() || current.template == entity.template {
                    return Ok((
                        SaveOutcome::Unchanged {
                            route: current.clone(),
                        },
                        None,
                    ));
                }
                let mut updated = table.clone();
                let outcome = apply_save(&mut updated, entity, path, webspace, locale, None)?;
                self.repository.save(&updated)?;
                *table = updated;
                return Ok((outcome, None));
            }
            ensure_available(table, entity, path, webspace, locale)?;

            let previous = table
                .find_active(&entity.id, webspace, locale)
                .map(|route| route.path.clone());
            let event = match &previous {
                Some(old_path) => DomainEvent::RouteRenamed {
                    entity_id: entity.id.clone(),
                    webspace: webspace.to_string(),
                    locale: locale.to_string(),
                    old_path: old_path.clone(),
                    new_path: path.to_string(),
                },
                None => DomainEvent::RouteCreated {
                    route_id: table
                        .find_by_path(path, webspace, locale)
                        .filter(|route| route.entity_id == entity.id)
                        .map(|route| route.id)
                        .unwrap_or_else(Uuid::new_v4),
                    entity_id: entity.id.clone(),
                    webspace: webspace.to_string(),
                    locale: locale.to_string(),
                    path: path.to_string(),
                },
            };
            if self.events.dispatch_before(event.clone()).is_canceled() {
                return Ok((SaveOutcome::Canceled, None));
            }

            let mut updated = table.clone();
            let route_id = match &event {
                DomainEvent::RouteCreated { route_id, .. } => Some(*route_id),
                _ => None,
            };
            let outcome = apply_save(&mut updated, entity, path, webspace, locale, route_id)?;
            self.repository.save(&updated)?;
            *table = updated;
            Ok((outcome, Some(event)))
        })?;

        if let Some(event) = event {
            self.events.dispatch_after(&event);
            log::info!("Route {} saved for entity {} ({}, {})", path, entity.id, webspace, locale);
        }
        Ok(outcome)
    }

    pub fn rename(
        &self,
        entity: &RouteEntity,
        new_path: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<SaveOutcome, RouteError> {
        self.save(entity, new_path, webspace, locale)
    }

    /// Re-saves every active route at or below `old_prefix` under `new_prefix`.
    pub fn move_tree(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<BatchOutcome, RouteError> {
        for prefix in [old_prefix, new_prefix] {
            if prefix == "/" || !PathCleanup::validate(prefix) {
                return Err(RouteError::InvalidPath(prefix.to_string()));
            }
        }
        if old_prefix == new_prefix {
            return Ok(BatchOutcome::Applied(0));
        }

        let (outcome, event) = self.with_routes_write(|table| {
            let mut moving: Vec<Route> = table
                .active_under(old_prefix, webspace, locale)
                .into_iter()
                .cloned()
                .collect();
            if moving.is_empty() {
                return Ok((BatchOutcome::Applied(0), None));
            }
            moving.sort_by(|a, b| a.path.cmp(&b.path));

            let moving_ids: Vec<&str> = moving.iter().map(|r| r.entity_id.as_str()).collect();
            for route in &moving {
                let target = replace_prefix(&route.path, old_prefix, new_prefix);
                if let Some(existing) = table.find_by_path(&target, webspace, locale)
                    && existing.is_active()
                    && !moving_ids.contains(&existing.entity_id.as_str())
                {
                    return Err(RouteError::AlreadyExists {
                        path: target,
                        entity_id: existing.entity_id.clone(),
                    });
                }
            }

            let event = DomainEvent::RouteTreeMoved {
                webspace: webspace.to_string(),
                locale: locale.to_string(),
                old_prefix: old_prefix.to_string(),
                new_prefix: new_prefix.to_string(),
            };
            if self.events.dispatch_before(event.clone()).is_canceled() {
                return Ok((BatchOutcome::Canceled, None));
            }

            let mut updated = table.clone();
            for route in &moving {
                let entity = RouteEntity {
                    class: route.entity_class.clone(),
                    id: route.entity_id.clone(),
                    template: route.template.clone(),
                };
                let target = replace_prefix(&route.path, old_prefix, new_prefix);
                apply_save(&mut updated, &entity, &target, webspace, locale, None)?;
            }
            self.repository.save(&updated)?;
            *table = updated;
            Ok((BatchOutcome::Applied(moving.len()), Some(event)))
        })?;

        if let Some(event) = event {
            self.events.dispatch_after(&event);
            log::info!(
                "Moved routes {} -> {} ({}, {}): {:?}",
                old_prefix,
                new_prefix,
                webspace,
                locale,
                outcome
            );
        }
        Ok(outcome)
    }

    /// Removes the active route of the entity and all its histories.
    pub fn delete_by_entity(
        &self,
        entity_id: &str,
        webspace: &str,
        locale: &str,
    ) -> Result<BatchOutcome, RouteError> {
        let (outcome, event) = self.with_routes_write(|table| {
            let active = table.find_active(entity_id, webspace, locale).cloned().ok_or_else(|| {
                RouteError::NotFound(format!("entity {} ({}, {})", entity_id, webspace, locale))
            })?;

            let event = DomainEvent::RouteRemoved {
                entity_id: entity_id.to_string(),
                webspace: webspace.to_string(),
                locale: locale.to_string(),
                path: active.path.clone(),
            };
            if self.events.dispatch_before(event.clone()).is_canceled() {
                return Ok((BatchOutcome::Canceled, None));
            }

            let mut updated = table.clone();
            let before = updated.routes.len();
            updated
                .routes
                .retain(|route| route.id != active.id && route.target != Some(active.id));
            let removed = before - updated.routes.len();
            self.repository.save(&updated)?;
            *table = updated;
            Ok((BatchOutcome::Applied(removed), Some(event)))
        })?;

        if let Some(event) = event {
            self.events.dispatch_after(&event);
        }
        Ok(outcome)
    }

    /// Removes one history route.
    pub fn delete_route(&self, id: Uuid) -> Result<BatchOutcome, RouteError> {
        let (outcome, event) = self.with_routes_write(|table| {
            let route = table
                .find_by_id(id)
                .cloned()
                .ok_or_else(|| RouteError::NotFound(id.to_string()))?;
            if route.is_active() {
                return Err(RouteError::ActiveRoute(route.path));
            }

            let event = DomainEvent::RouteRemoved {
                entity_id: route.entity_id.clone(),
                webspace: route.webspace.clone(),
                locale: route.locale.clone(),
                path: route.path.clone(),
            };
            if self.events.dispatch_before(event.clone()).is_canceled() {
                return Ok((BatchOutcome::Canceled, None));
            }

            let mut updated = table.clone();
            updated.remove(id);
            self.repository.save(&updated)?;
            *table = updated;
            Ok((BatchOutcome::Applied(1), Some(event)))
        })?;

        if let Some(event) = event {
            self.events.dispatch_after(&event);
        }
        Ok(outcome)
    }

    /// Builds a resource locator from a title below `parent_path`.
    pub fn generate(&self, title: &str, parent_path: Option<&str>, locale: &str) -> String {
        let segment = self.cleanup.cleanup(&title.replace('/', "-"), locale);
        let segment = segment.trim_start_matches('/');
        let parent = parent_path
            .map(|parent| parent.trim_end_matches('/'))
            .unwrap_or("");
        if segment.is_empty() {
            if parent.is_empty() {
                "/".to_string()
            } else {
                parent.to_string()
            }
        } else {
            format!("{}/{}", parent, segment)
        }
    }

    /// `path` when no route uses it yet, otherwise the first free `path-N`.
    pub fn unique_path(&self, path: &str, webspace: &str, locale: &str) -> Result<String, RouteError> {
        self.with_routes_read(|table| {
            if table.find_by_path(path, webspace, locale).is_none() {
                return Ok(path.to_string());
            }
            for attempt in 1..=MAX_UNIQUE_ATTEMPTS {
                let candidate = format!("{}-{}", path, attempt);
                if table.find_by_path(&candidate, webspace, locale).is_none() {
                    return Ok(candidate);
                }
            }
            Err(RouteError::AlreadyExists {
                path: path.to_string(),
                entity_id: String::new(),
            })
        })
    }

    /// Locales in which the entity has an active route, sorted.
    pub fn locales_of(&self, entity_id: &str, webspace: &str) -> Result<Vec<String>, RouteError> {
        self.with_routes_read(|table| {
            let mut locales: Vec<String> = table
                .routes
                .iter()
                .filter(|route| {
                    route.is_active() && route.entity_id == entity_id && route.webspace == webspace
                })
                .map(|route| route.locale.clone())
                .collect();
            locales.sort();
            locales.dedup();
            Ok(locales)
        })
    }

    pub fn routes(&self, webspace: &str, locale: &str) -> Result<Vec<Route>, RouteError> {
        self.with_routes_read(|table| {
            Ok(table
                .routes
                .iter()
                .filter(|route| route.webspace == webspace && route.locale == locale)
                .cloned()
                .collect())
        })
    }
}

fn resolved(route: &Route, moved_to: Option<String>) -> ResolvedRoute {
    ResolvedRoute {
        route_id: route.id,
        entity_class: route.entity_class.clone(),
        entity_id: route.entity_id.clone(),
        path: route.path.clone(),
        template: route.template.clone(),
        moved_to,
    }
}

fn validate_path(entity: &RouteEntity, path: &str) -> Result<(), RouteError> {
    if !PathCleanup::validate(path) {
        return Err(RouteError::InvalidPath(path.to_string()));
    }
    if path == "/" && !entity.is_homepage() {
        return Err(RouteError::InvalidPath(format!(
            "{} is reserved for the homepage",
            path
        )));
    }
    Ok(())
}

fn ensure_available(
    table: &RouteTable,
    entity: &RouteEntity,
    path: &str,
    webspace: &str,
    locale: &str,
) -> Result<(), RouteError> {
    match table.find_by_path(path, webspace, locale) {
        Some(existing) if existing.is_active() && existing.entity_id != entity.id => {
            Err(RouteError::AlreadyExists {
                path: path.to_string(),
                entity_id: existing.entity_id.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn replace_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> String {
    debug_assert!(is_at_or_under(path, old_prefix));
    format!("{}{}", new_prefix, &path[old_prefix.len()..])
}

/// Makes `path` the active route of `entity` inside `table`.
fn apply_save(
    table: &mut RouteTable,
    entity: &RouteEntity,
    path: &str,
    webspace: &str,
    locale: &str,
    new_id: Option<Uuid>,
) -> Result<SaveOutcome, RouteError> {
    ensure_available(table, entity, path, webspace, locale)?;

    let current = table.find_active(&entity.id, webspace, locale).cloned();
    if let Some(current) = &current
        && current.path == path
    {
        let route = table
            .get_mut(current.id)
            .ok_or_else(|| RouteError::NotFound(current.id.to_string()))?;
        if entity.template.is_some() {
            route.template = entity.template.clone();
        }
        return Ok(SaveOutcome::Unchanged {
            route: route.clone(),
        });
    }

    let existing = table.find_by_path(path, webspace, locale).cloned();
    let route_id = match existing {
        Some(history) if history.entity_id == entity.id => {
            let route = table
                .get_mut(history.id)
                .ok_or_else(|| RouteError::NotFound(history.id.to_string()))?;
            route.history = false;
            route.target = None;
            route.entity_class = entity.class.clone();
            if entity.template.is_some() {
                route.template = entity.template.clone();
            }
            history.id
        }
        existing => {
            if let Some(foreign) = existing {
                log::info!(
                    "Reclaiming history route {} of entity {} for entity {}",
                    foreign.path,
                    foreign.entity_id,
                    entity.id
                );
                table.remove(foreign.id);
            }
            let mut route = Route::new(entity, path, webspace, locale);
            if let Some(id) = new_id {
                route.id = id;
            }
            if entity.template.is_none()
                && let Some(current) = &current
            {
                route.template = current.template.clone();
            }
            let id = route.id;
            table.routes.push(route);
            id
        }
    };

    if let Some(current) = &current {
        for route in table.routes.iter_mut() {
            if route.id == current.id {
                route.history = true;
                route.target = Some(route_id);
            } else if route.history && route.target == Some(current.id) {
                route.target = Some(route_id);
            }
        }
    }

    let route = table
        .find_by_id(route_id)
        .cloned()
        .ok_or_else(|| RouteError::NotFound(route_id.to_string()))?;
    Ok(match current {
        Some(current) => SaveOutcome::Renamed {
            route,
            previous_path: current.path,
        },
        None => SaveOutcome::Created { route },
    })
}
