// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::RouteError;
use super::route::RouteTable;
use crate::store::YamlFile;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

pub trait RouteRepository: Send + Sync {
    fn load(&self) -> Result<RouteTable, RouteError>;
    fn save(&self, table: &RouteTable) -> Result<(), RouteError>;
}

pub struct YamlRouteRepository {
    file: YamlFile,
}

impl YamlRouteRepository {
    pub fn new(routes_file: PathBuf) -> Result<Self, RouteError> {
        if routes_file.as_os_str().is_empty() {
            return Err(RouteError::Storage("Routes file path is empty".to_string()));
        }
        Ok(Self {
            file: YamlFile::new(routes_file, "routes"),
        })
    }
}

impl RouteRepository for YamlRouteRepository {
    fn load(&self) -> Result<RouteTable, RouteError> {
        let table: Option<RouteTable> = self.file.read()?;
        Ok(table.unwrap_or_default())
    }

    fn save(&self, table: &RouteTable) -> Result<(), RouteError> {
        self.file.write(table)?;
        Ok(())
    }
}

/// Keeps routes in memory only; useful for tests and previews.
#[derive(Default)]
pub struct MemoryRouteRepository {
    table: Arc<RwLock<RouteTable>>,
    saves: AtomicUsize,
}

impl MemoryRouteRepository {
    pub fn new(initial: RouteTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(initial)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RouteRepository for MemoryRouteRepository {
    fn load(&self) -> Result<RouteTable, RouteError> {
        match self.table.read() {
            Ok(guard) => Ok(guard.clone()),
            Err(poisoned) => {
                log::error!("MemoryRouteRepository lock poisoned on read; recovering");
                Ok(poisoned.into_inner().clone())
            }
        }
    }

    fn save(&self, table: &RouteTable) -> Result<(), RouteError> {
        let mut guard = match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("MemoryRouteRepository lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        };
        *guard = table.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
