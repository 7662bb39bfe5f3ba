// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    LoadError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::LoadError(msg) => write!(f, "Configuration load error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment stage a portal URL belongs to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Stage,
    Dev,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Stage => "stage",
            Environment::Dev => "dev",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prod" => Some(Environment::Prod),
            "stage" => Some(Environment::Stage),
            "dev" => Some(Environment::Dev),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_environment() -> Environment {
    Environment::Prod
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebspacesConfig {
    #[serde(default = "default_webspaces_path")]
    pub path: String,
}

impl Default for WebspacesConfig {
    fn default() -> Self {
        Self {
            path: default_webspaces_path(),
        }
    }
}

fn default_webspaces_path() -> String {
    "webspaces".to_string()
}

/// Search paths and load-time rules for one document type (page, snippet, ...).
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StructureTypeConfig {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub required_properties: Vec<String>,
    #[serde(default)]
    pub required_tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> String {
    "cache".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CollaborationConfig {
    #[serde(default = "default_collaboration_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default = "default_collaboration_threshold_seconds")]
    pub threshold_seconds: u64,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_collaboration_interval_seconds(),
            threshold_seconds: default_collaboration_threshold_seconds(),
        }
    }
}

fn default_collaboration_interval_seconds() -> u64 {
    20
}

fn default_collaboration_threshold_seconds() -> u64 {
    60
}

/// Character replacements applied when generating resource locators.
/// The `default` entry applies to every locale, the other keys are language codes.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PathCleanupConfig {
    #[serde(default = "default_path_replacers")]
    pub replacers: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for PathCleanupConfig {
    fn default() -> Self {
        Self {
            replacers: default_path_replacers(),
        }
    }
}

pub fn default_path_replacers() -> BTreeMap<String, BTreeMap<String, String>> {
    fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    let mut replacers = BTreeMap::new();
    replacers.insert(
        "default".to_string(),
        table(&[(" ", "-"), ("+", "-"), (".", "-")]),
    );
    replacers.insert(
        "de".to_string(),
        table(&[
            ("ä", "ae"),
            ("ö", "oe"),
            ("ü", "ue"),
            ("Ä", "ae"),
            ("Ö", "oe"),
            ("Ü", "ue"),
            ("ß", "ss"),
            ("&", "und"),
        ]),
    );
    replacers.insert("en".to_string(), table(&[("&", "and")]));
    replacers.insert("fr".to_string(), table(&[("&", "et")]));
    replacers
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    #[serde(default = "default_environment")]
    pub environment: Environment,
    #[serde(default)]
    pub webspaces: WebspacesConfig,
    #[serde(default)]
    pub structures: BTreeMap<String, StructureTypeConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub collaboration: CollaborationConfig,
    #[serde(default)]
    pub path_cleanup: PathCleanupConfig,
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
    pub environment: Environment,
    pub webspaces: WebspacesConfig,
    pub structures: BTreeMap<String, StructureTypeConfig>,
    pub cache: CacheConfig,
    pub collaboration: CollaborationConfig,
    pub path_cleanup: PathCleanupConfig,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join("config.yaml");
        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&config_content).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to parse config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Loads and validates configuration at startup. If validation fails, the application should not start.
    pub fn load_and_validate(root: &Path) -> Result<ValidatedConfig, ConfigError> {
        let config = Self::load(root)?;
        config.validate()
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        Self::validate_server(&self.server)?;
        Self::validate_admin(&self.admin)?;
        Self::validate_logging(&self.logging)?;
        Self::validate_structures(&self.structures)?;
        Self::validate_collaboration(&self.collaboration)?;
        Self::validate_path_cleanup(&self.path_cleanup)?;

        if self.structures.is_empty() {
            warn!("No structure document types configured; structure lookups will fail");
        }

        Ok(ValidatedConfig {
            server: self.server,
            admin: self.admin,
            app: self.app,
            logging: self.logging,
            environment: self.environment,
            webspaces: self.webspaces,
            structures: self.structures,
            cache: self.cache,
            collaboration: self.collaboration,
            path_cleanup: self.path_cleanup,
        })
    }

    fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
        if server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }
        if server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        if server.workers == 0 {
            return Err(ConfigError::ValidationError(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_admin(admin: &AdminConfig) -> Result<(), ConfigError> {
        let path = admin.path.trim();
        if !path.starts_with('/') || path == "/" || path.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "admin.path must start with '/' and name a sub path, got: '{}'",
                admin.path
            )));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got: '{}'",
                LOG_LEVELS.join(", "),
                logging.level
            )));
        }
        Ok(())
    }

    fn validate_structures(
        structures: &BTreeMap<String, StructureTypeConfig>,
    ) -> Result<(), ConfigError> {
        for (document_type, settings) in structures {
            if document_type.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "structures: document type names cannot be empty".to_string(),
                ));
            }
            if settings.paths.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "structures.{}.paths must list at least one directory",
                    document_type
                )));
            }
            if settings.paths.iter().any(|path| path.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "structures.{}.paths contains an empty entry",
                    document_type
                )));
            }
        }
        Ok(())
    }

    fn validate_collaboration(collaboration: &CollaborationConfig) -> Result<(), ConfigError> {
        if collaboration.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "collaboration.interval_seconds must be greater than 0".to_string(),
            ));
        }
        if collaboration.threshold_seconds < collaboration.interval_seconds {
            return Err(ConfigError::ValidationError(format!(
                "collaboration.threshold_seconds ({}) must not be smaller than interval_seconds ({})",
                collaboration.threshold_seconds, collaboration.interval_seconds
            )));
        }
        Ok(())
    }

    fn validate_path_cleanup(path_cleanup: &PathCleanupConfig) -> Result<(), ConfigError> {
        for (locale, table) in &path_cleanup.replacers {
            if table.keys().any(|from| from.is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "path_cleanup.replacers.{} contains an empty search string",
                    locale
                )));
            }
        }
        Ok(())
    }
}

impl ValidatedConfig {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    }

    pub fn admin_api_path(&self) -> String {
        format!("{}/api", self.admin.path.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::fs;

    const MINIMAL_CONFIG: &str = "server:\n  host: \"127.0.0.1\"\n  port: 8080\nadmin:\n  path: \"/admin\"\napp:\n  name: \"Sulu\"\nlogging:\n  level: \"info\"\n";

    #[test]
    fn load_applies_defaults() {
        let fixture = TestFixtureRoot::new_unique("config-defaults").unwrap();
        fs::write(fixture.path().join("config.yaml"), MINIMAL_CONFIG).unwrap();
        let config = Config::load_and_validate(fixture.path()).expect("valid config");
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.server.workers, 4);
        assert_eq!(config.webspaces.path, "webspaces");
        assert_eq!(config.cache.path, "cache");
        assert_eq!(config.collaboration.interval_seconds, 20);
        assert!(config.path_cleanup.replacers.contains_key("de"));
        assert!(config.structures.is_empty());
    }

    #[test]
    fn load_reads_structure_settings() {
        let fixture = TestFixtureRoot::new_unique("config-structures").unwrap();
        let yaml = format!(
            "{}environment: dev\nstructures:\n  page:\n    paths: [\"templates/pages\"]\n    required_properties: [\"title\"]\n    required_tags: [\"sulu.rlp\"]\n",
            MINIMAL_CONFIG
        );
        fs::write(fixture.path().join("config.yaml"), yaml).unwrap();
        let config = Config::load_and_validate(fixture.path()).expect("valid config");
        assert_eq!(config.environment, Environment::Dev);
        let page = config.structures.get("page").expect("page settings");
        assert_eq!(page.paths, vec!["templates/pages".to_string()]);
        assert_eq!(page.required_tags, vec!["sulu.rlp".to_string()]);
    }

    #[test]
    fn load_reports_missing_file() {
        let fixture = TestFixtureRoot::new_unique("config-missing").unwrap();
        let err = Config::load(fixture.path()).expect_err("missing config should fail");
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn validate_rejects_structure_type_without_paths() {
        let mut structures = BTreeMap::new();
        structures.insert("page".to_string(), StructureTypeConfig::default());
        assert!(Config::validate_structures(&structures).is_err());
    }

    #[test]
    fn validate_rejects_root_admin_path() {
        let admin = AdminConfig {
            path: "/".to_string(),
        };
        assert!(Config::validate_admin(&admin).is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_level() {
        let logging = LoggingConfig {
            level: "loud".to_string(),
        };
        assert!(Config::validate_logging(&logging).is_err());
    }

    #[test]
    fn validate_rejects_threshold_below_interval() {
        let collaboration = CollaborationConfig {
            interval_seconds: 30,
            threshold_seconds: 10,
        };
        assert!(Config::validate_collaboration(&collaboration).is_err());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::parse("Stage"), Some(Environment::Stage));
        assert_eq!(Environment::parse("qa"), None);
    }
}
