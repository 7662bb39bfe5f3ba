// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{ConfigError, ValidatedConfig};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub webspaces_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub state_dir: PathBuf,
    /// Structure search paths per document type, in configured order.
    pub structure_paths: BTreeMap<String, Vec<PathBuf>>,
}

impl RuntimePaths {
    pub fn from_root(root: &Path, config: &ValidatedConfig) -> Result<Self, ConfigError> {
        let root_path = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root.to_path_buf()
        };

        if !root_path.exists() {
            fs::create_dir_all(&root_path).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Failed to create runtime root '{}': {}",
                    root_path.display(),
                    e
                ))
            })?;
        }

        let root_canonical = canonicalize(&root_path, "runtime root")?;

        let config_file = root_canonical.join("config.yaml");
        ensure_file_writable(&config_file, "Config file must be writable")?;

        let webspaces_dir = resolve(&root_canonical, &config.webspaces.path);
        let cache_dir = resolve(&root_canonical, &config.cache.path);
        let state_dir = root_canonical.join("state");

        ensure_dir_exists(&webspaces_dir)?;
        ensure_dir_exists(&cache_dir)?;
        ensure_dir_exists(&state_dir)?;

        let mut structure_paths = BTreeMap::new();
        for (document_type, settings) in &config.structures {
            let mut paths = Vec::with_capacity(settings.paths.len());
            for raw in &settings.paths {
                let path = resolve(&root_canonical, raw);
                if !path.is_dir() {
                    log::warn!(
                        "Structure path for '{}' does not exist: {}",
                        document_type,
                        path.display()
                    );
                }
                paths.push(path);
            }
            structure_paths.insert(document_type.clone(), paths);
        }

        Ok(Self {
            webspaces_dir: canonicalize(&webspaces_dir, "webspaces directory")?,
            cache_dir: canonicalize(&cache_dir, "cache directory")?,
            state_dir: canonicalize(&state_dir, "state directory")?,
            root: root_canonical,
            config_file,
            structure_paths,
        })
    }

    pub fn routes_file(&self) -> PathBuf {
        self.state_dir.join("routes.yaml")
    }

    pub fn tags_file(&self) -> PathBuf {
        self.state_dir.join("tags.yaml")
    }

    pub fn trash_file(&self) -> PathBuf {
        self.state_dir.join("trash.yaml")
    }

    pub fn structure_cache_dir(&self) -> PathBuf {
        self.cache_dir.join("structures")
    }
}

fn resolve(root: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw.trim());
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn canonicalize(path: &Path, label: &str) -> Result<PathBuf, ConfigError> {
    path.canonicalize().map_err(|e| {
        ConfigError::ValidationError(format!(
            "Failed to canonicalize {} '{}': {}",
            label,
            path.display(),
            e
        ))
    })
}

fn ensure_dir_exists(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            ConfigError::ValidationError(format!(
                "Failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
    }

    ensure_dir_writable(path, "Directory must be writable")
}

fn ensure_dir_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a directory): {}",
            context,
            path.display()
        )));
    }

    let check_path = path.join(format!(".sulu-write-check-{}", Uuid::new_v4()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&check_path)
    {
        Ok(_) => fs::remove_file(&check_path).map_err(|err| {
            ConfigError::ValidationError(format!(
                "{} (unable to clean write-check file {}): {}",
                context,
                check_path.display(),
                err
            ))
        }),
        Err(err) => Err(ConfigError::ValidationError(format!(
            "{} ({}): {}",
            context,
            path.display(),
            err
        ))),
    }
}

fn ensure_file_writable(path: &Path, context: &str) -> Result<(), ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ValidationError(format!(
            "{} (not a file): {}",
            context,
            path.display()
        )));
    }

    fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|err| {
            ConfigError::ValidationError(format!("{} ({}): {}", context, path.display(), err))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_config::TestConfigBuilder;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn from_root_creates_state_and_cache_dirs() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths").unwrap();
        fs::write(fixture.path().join("config.yaml"), "").unwrap();
        let config = TestConfigBuilder::new()
            .with_structure_paths("page", &["templates/pages"])
            .build();

        let paths = RuntimePaths::from_root(fixture.path(), &config).expect("runtime paths");
        assert!(paths.state_dir.is_dir());
        assert!(paths.cache_dir.is_dir());
        assert!(paths.webspaces_dir.is_dir());
        assert!(paths.routes_file().starts_with(&paths.state_dir));
        let page_paths = paths.structure_paths.get("page").expect("page paths");
        assert!(page_paths[0].ends_with("templates/pages"));
    }

    #[test]
    fn from_root_requires_config_file() {
        let fixture = TestFixtureRoot::new_unique("runtime-paths-missing").unwrap();
        let config = TestConfigBuilder::new().build();
        assert!(RuntimePaths::from_root(fixture.path(), &config).is_err());
    }
}
