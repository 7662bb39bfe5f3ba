// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use crate::config::{
    AdminConfig, AppConfig, CacheConfig, CollaborationConfig, Environment, LoggingConfig,
    PathCleanupConfig, ServerConfig, StructureTypeConfig, ValidatedConfig, WebspacesConfig,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: ValidatedConfig,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatedConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 5466,
                    workers: 1,
                },
                admin: AdminConfig {
                    path: "/admin".to_string(),
                },
                app: AppConfig {
                    name: "Test App".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                },
                environment: Environment::Prod,
                webspaces: WebspacesConfig::default(),
                structures: BTreeMap::new(),
                cache: CacheConfig::default(),
                collaboration: CollaborationConfig::default(),
                path_cleanup: PathCleanupConfig::default(),
            },
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn with_admin_path(mut self, path: &str) -> Self {
        self.config.admin.path = path.to_string();
        self
    }

    pub fn with_structure_paths(mut self, document_type: &str, paths: &[&str]) -> Self {
        let entry = self
            .config
            .structures
            .entry(document_type.to_string())
            .or_insert_with(StructureTypeConfig::default);
        entry.paths = paths.iter().map(|path| path.to_string()).collect();
        self
    }

    pub fn with_required_properties(mut self, document_type: &str, names: &[&str]) -> Self {
        let entry = self
            .config
            .structures
            .entry(document_type.to_string())
            .or_insert_with(StructureTypeConfig::default);
        entry.required_properties = names.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_required_tags(mut self, document_type: &str, tags: &[&str]) -> Self {
        let entry = self
            .config
            .structures
            .entry(document_type.to_string())
            .or_insert_with(StructureTypeConfig::default);
        entry.required_tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn build(self) -> ValidatedConfig {
        self.config
    }
}

pub fn test_config() -> ValidatedConfig {
    TestConfigBuilder::new().build()
}
