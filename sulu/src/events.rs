// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// Something that changed, or is about to change, in the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    RouteCreated {
        route_id: Uuid,
        entity_id: String,
        webspace: String,
        locale: String,
        path: String,
    },
    RouteRenamed {
        entity_id: String,
        webspace: String,
        locale: String,
        old_path: String,
        new_path: String,
    },
    RouteTreeMoved {
        webspace: String,
        locale: String,
        old_prefix: String,
        new_prefix: String,
    },
    RouteRemoved {
        entity_id: String,
        webspace: String,
        locale: String,
        path: String,
    },
    ResourceTrashed {
        trash_item_id: Uuid,
        resource_key: String,
        resource_id: String,
        title: String,
    },
    TrashItemRestored {
        trash_item_id: Uuid,
        resource_key: String,
        resource_id: String,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::RouteCreated { .. } => "route.created",
            DomainEvent::RouteRenamed { .. } => "route.renamed",
            DomainEvent::RouteTreeMoved { .. } => "route.tree_moved",
            DomainEvent::RouteRemoved { .. } => "route.removed",
            DomainEvent::ResourceTrashed { .. } => "resource.trashed",
            DomainEvent::TrashItemRestored { .. } => "trash_item.restored",
        }
    }
}

/// An event on its way to listeners before the write happens.
#[derive(Debug)]
pub struct EventEnvelope {
    event: DomainEvent,
    canceled: bool,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            event,
            canceled: false,
        }
    }

    pub fn event(&self) -> &DomainEvent {
        &self.event
    }

    pub fn cancel(&mut self) {
        self.canceled = true;
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn into_event(self) -> DomainEvent {
        self.event
    }
}

pub trait EventListener: Send + Sync {
    /// Called before the write. Calling `cancel()` skips it.
    ///
    /// Route events arrive while the route table write lock is held, so the
    /// decision and the write stay atomic. Decide from the envelope alone:
    /// reading routes through the strategy from here blocks forever.
    fn before(&self, _envelope: &mut EventEnvelope) {}

    /// Called after a successful write, with every lock released. Reading
    /// routes from here sees the write.
    fn after(&self, _event: &DomainEvent) {}
}

#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        match self.listeners.write() {
            Ok(mut guard) => guard.push(listener),
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Event listener lock poisoned on subscribe; recovering");
                poisoned.into_inner().push(listener);
            }
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn EventListener>> {
        match self.listeners.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Event listener lock poisoned on read; recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    /// Runs every `before` hook. Stops at the first listener that cancels.
    /// The route strategy holds its write lock while this runs.
    pub fn dispatch_before(&self, event: DomainEvent) -> EventEnvelope {
        let mut envelope = EventEnvelope::new(event);
        for listener in self.snapshot() {
            listener.before(&mut envelope);
            if envelope.is_canceled() {
                log::info!("Event {} canceled by listener", envelope.event().name());
                break;
            }
        }
        envelope
    }

    pub fn dispatch_after(&self, event: &DomainEvent) {
        log::debug!("Dispatching event {}", event.name());
        for listener in self.snapshot() {
            listener.after(event);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub name: &'static str,
    pub event: DomainEvent,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded in-memory log of completed events, newest last.
pub struct ActivityLog {
    entries: Mutex<VecDeque<Activity>>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, event: &DomainEvent) {
        let activity = Activity {
            id: Uuid::new_v4(),
            name: event.name(),
            event: event.clone(),
            recorded_at: Utc::now(),
        };
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Activity log lock poisoned; recovering");
                poisoned.into_inner()
            }
        };
        if guard.len() == self.capacity {
            guard.pop_front();
        }
        guard.push_back(activity);
    }

    /// Up to `limit` activities, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Activity> {
        let guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("🚨 CRITICAL: Activity log lock poisoned; recovering");
                poisoned.into_inner()
            }
        };
        guard.iter().rev().take(limit).cloned().collect()
    }
}

impl EventListener for ActivityLog {
    fn after(&self, event: &DomainEvent) {
        self.record(event);
    }
}
