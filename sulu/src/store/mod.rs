// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Small file-backed persistence helpers shared by the route, tag and trash stores
//! and the structure metadata cache.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_TEMP_ATTEMPTS: u32 = 100;

#[derive(Debug)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StoreError {}

/// A YAML document on disk holding one serializable value.
#[derive(Debug, Clone)]
pub struct YamlFile {
    path: PathBuf,
    label: &'static str,
}

impl YamlFile {
    pub fn new(path: PathBuf, label: &'static str) -> Self {
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing and blank files both read as `None`.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|err| {
            StoreError::new(format!("Failed to read {} file: {}", self.label, err))
        })?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|err| StoreError::new(format!("Failed to parse {} file: {}", self.label, err)))
    }

    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let content = serde_yaml::to_string(value).map_err(|err| {
            StoreError::new(format!("Failed to serialize {}: {}", self.label, err))
        })?;
        write_atomic(&self.path, self.label, content.as_bytes())
    }
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path, label: &str) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read(path)
        .map_err(|err| StoreError::new(format!("Failed to read {} file: {}", label, err)))?;
    serde_json::from_slice(&content)
        .map(Some)
        .map_err(|err| StoreError::new(format!("Failed to parse {} file: {}", label, err)))
}

pub fn write_json_file<T: Serialize>(path: &Path, label: &str, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_vec_pretty(value)
        .map_err(|err| StoreError::new(format!("Failed to serialize {}: {}", label, err)))?;
    write_atomic(path, label, &content)
}

/// Replaces `path` through a sibling temp file so readers never see a partial write.
pub fn write_atomic(path: &Path, label: &str, content: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::new(format!("{} file path has no parent directory", label)))?;
    fs::create_dir_all(parent).map_err(|err| {
        StoreError::new(format!("Failed to create {} directory: {}", label, err))
    })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StoreError::new(format!("{} file path has no valid file name", label)))?;
    let (mut file, temp_path) = create_temp_file(parent, file_name, label)?;

    #[cfg(unix)]
    if let Ok(metadata) = fs::metadata(path)
        && let Err(err) = fs::set_permissions(&temp_path, metadata.permissions())
    {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::new(format!(
            "Failed to set temp {} file permissions: {}",
            label, err
        )));
    }

    if let Err(err) = file.write_all(content).and_then(|_| file.sync_all()) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::new(format!(
            "Failed to write {} temp file: {}",
            label, err
        )));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::new(format!(
            "Failed to replace {} file: {}",
            label, err
        )));
    }

    #[cfg(unix)]
    if let Err(err) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
        log::warn!("{} directory sync failed: {}", label, err);
    }

    Ok(())
}

fn create_temp_file(
    parent: &Path,
    file_name: &str,
    label: &str,
) -> Result<(fs::File, PathBuf), StoreError> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp_path = parent.join(format!(
            ".{}.tmp.{}.{}",
            file_name,
            std::process::id(),
            attempt
        ));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(file) => return Ok((file, temp_path)),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(StoreError::new(format!(
                    "Failed to create temp {} file: {}",
                    label, err
                )));
            }
        }
    }
    Err(StoreError::new(format!(
        "Failed to create temp {} file after multiple attempts",
        label
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;
    use std::collections::BTreeMap;

    #[test]
    fn yaml_file_reads_missing_and_blank_as_none() {
        let fixture = TestFixtureRoot::new_unique("store-blank").unwrap();
        let file = YamlFile::new(fixture.path().join("routes.yaml"), "routes");
        assert!(file.read::<Vec<String>>().unwrap().is_none());
        fs::write(file.path(), "  \n").unwrap();
        assert!(file.read::<Vec<String>>().unwrap().is_none());
    }

    #[test]
    fn yaml_file_write_replaces_content() {
        let fixture = TestFixtureRoot::new_unique("store-write").unwrap();
        let file = YamlFile::new(fixture.path().join("state").join("tags.yaml"), "tags");
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1u32);
        file.write(&value).unwrap();
        value.insert("b".to_string(), 2u32);
        file.write(&value).unwrap();

        let read: BTreeMap<String, u32> = file.read().unwrap().expect("content");
        assert_eq!(read.len(), 2);
        let leftovers = fs::read_dir(fixture.path().join("state"))
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn yaml_file_reports_parse_errors() {
        let fixture = TestFixtureRoot::new_unique("store-parse").unwrap();
        let file = YamlFile::new(fixture.path().join("trash.yaml"), "trash");
        fs::write(file.path(), "- [unclosed").unwrap();
        let err = file.read::<Vec<String>>().expect_err("invalid yaml");
        assert!(err.message().contains("trash"));
    }
}
