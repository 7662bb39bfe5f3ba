// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{Config, ConfigError, ValidatedConfig};
use crate::runtime_paths::RuntimePaths;
use std::error::Error;
use std::fmt;
use std::path::Path;

pub mod config;
pub mod paths;
pub mod root_guard;

#[derive(Debug)]
pub struct BootstrapResult {
    pub validated_config: ValidatedConfig,
    pub runtime_paths: RuntimePaths,
    pub created_config: bool,
}

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::Config(err) => write!(f, "{}", err),
            BootstrapError::Io(err) => write!(f, "Bootstrap I/O error: {}", err),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BootstrapError::Config(err) => Some(err),
            BootstrapError::Io(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(err: ConfigError) -> Self {
        BootstrapError::Config(err)
    }
}

impl From<std::io::Error> for BootstrapError {
    fn from(err: std::io::Error) -> Self {
        BootstrapError::Io(err)
    }
}

pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, BootstrapError> {
    let root_path = root_guard::inspect_root(root)?.root;
    let created_config = config::ensure_config(&root_path)?;
    let validated_config = Config::load_and_validate(&root_path)?;
    let runtime_paths = paths::ensure_paths(&root_path, &validated_config)?;

    Ok(BootstrapResult {
        validated_config,
        runtime_paths,
        created_config,
    })
}

pub(crate) fn log_action(message: impl AsRef<str>) {
    eprintln!("[bootstrap] {}", message.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webspace::WebspaceManager;
    use std::fs;

    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn bootstrap_creates_defaults_when_missing() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-default").unwrap();
        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");

        assert!(result.created_config);
        assert_eq!(result.validated_config.server.port, 8080);
        assert!(fixture.path().join("webspaces").join("example.xml").exists());
        assert!(
            fixture
                .path()
                .join("templates")
                .join("pages")
                .join("default.xml")
                .exists()
        );
        assert!(result.runtime_paths.state_dir.is_dir());

        let manager = WebspaceManager::load(&result.runtime_paths.webspaces_dir).unwrap();
        assert!(manager.find_webspace("example").is_some());
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-idempotent").unwrap();
        bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        let config_path = fixture.path().join("config.yaml");
        let webspace_path = fixture.path().join("webspaces").join("example.xml");
        let config_before = fs::read_to_string(&config_path).unwrap();
        fs::write(&webspace_path, paths::EXAMPLE_WEBSPACE_XML.replace("Example", "Mine")).unwrap();

        let second = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(!second.created_config);
        assert_eq!(config_before, fs::read_to_string(&config_path).unwrap());
        assert!(fs::read_to_string(&webspace_path).unwrap().contains("Mine"));
    }

    #[test]
    fn bootstrap_rejects_unexpected_root_entries() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-unexpected").unwrap();
        fs::write(fixture.path().join("notes.txt"), "do not use").unwrap();

        let error = bootstrap_runtime(fixture.path()).expect_err("bootstrap should fail");
        let message = error.to_string();
        assert!(message.contains("unexpected entries"));
        assert!(message.contains("notes.txt"));
    }

    #[test]
    fn bootstrap_restores_missing_directories() {
        let fixture = TestFixtureRoot::new_unique("bootstrap-restore").unwrap();
        bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        fs::remove_dir_all(fixture.cache_dir()).unwrap();
        fs::remove_dir_all(fixture.path().join("templates")).unwrap();

        let inspection = root_guard::inspect_root(fixture.path()).unwrap();
        assert_eq!(inspection.missing_dirs, vec!["templates", "cache"]);

        let result = bootstrap_runtime(fixture.path()).expect("bootstrap should succeed");
        assert!(fixture.cache_dir().is_dir());
        assert!(result.runtime_paths.state_dir.is_dir());
        assert!(fixture.templates_dir("pages").join("default.xml").exists());
    }
}
