// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod path_cleanup;
pub mod repository;
pub mod route;
pub mod strategy;

pub use path_cleanup::PathCleanup;
pub use repository::{MemoryRouteRepository, RouteRepository, YamlRouteRepository};
pub use route::{Route, RouteEntity, RouteTable};
pub use strategy::{BatchOutcome, ResolvedRoute, ResourceLocatorStrategy, SaveOutcome};

use crate::hash::HashError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    NotFound(String),
    AlreadyExists { path: String, entity_id: String },
    InvalidPath(String),
    /// Active routes go away with their entity, not one by one.
    ActiveRoute(String),
    /// The client edited an outdated version of the active route.
    InvalidHash(HashError),
    Storage(String),
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::NotFound(what) => write!(f, "Route not found: {}", what),
            RouteError::AlreadyExists { path, entity_id } => write!(
                f,
                "Resource locator {} is already used by entity {}",
                path, entity_id
            ),
            RouteError::InvalidPath(path) => write!(f, "Invalid resource locator: {}", path),
            RouteError::ActiveRoute(path) => {
                write!(f, "Route {} is active and cannot be deleted on its own", path)
            }
            RouteError::InvalidHash(err) => write!(f, "{}", err),
            RouteError::Storage(msg) => write!(f, "Route storage error: {}", msg),
        }
    }
}

impl std::error::Error for RouteError {}

impl From<HashError> for RouteError {
    fn from(err: HashError) -> Self {
        RouteError::InvalidHash(err)
    }
}

impl From<StoreError> for RouteError {
    fn from(err: StoreError) -> Self {
        RouteError::Storage(err.message().to_string())
    }
}
