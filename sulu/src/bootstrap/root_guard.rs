// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

/// Everything a Sulu runtime root may hold.
const SULU_LAYOUT: [(&str, EntryKind); 5] = [
    ("config.yaml", EntryKind::File),
    ("webspaces", EntryKind::Dir),
    ("templates", EntryKind::Dir),
    ("cache", EntryKind::Dir),
    ("state", EntryKind::Dir),
];

/// What a runtime root looked like before bootstrap touched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInspection {
    pub root: PathBuf,
    /// Sulu directories absent from a root that already held other Sulu entries.
    pub missing_dirs: Vec<&'static str>,
}

/// Refuses roots with foreign entries or a Sulu name of the wrong kind, and
/// reports which Sulu directories an existing root lacks.
pub fn inspect_root(root: &Path) -> Result<RootInspection, BootstrapError> {
    let root_path = normalize_root(root)?;
    let present = verify_root_entries(&root_path)?;
    let missing_dirs = if present.is_empty() {
        Vec::new()
    } else {
        SULU_LAYOUT
            .iter()
            .filter(|(name, kind)| *kind == EntryKind::Dir && !present.contains(name))
            .map(|(name, _)| *name)
            .collect()
    };
    if !missing_dirs.is_empty() {
        log_action(format!(
            "runtime root {} is missing {}; recreating",
            root_path.display(),
            missing_dirs.join(", ")
        ));
    }
    Ok(RootInspection {
        root: root_path,
        missing_dirs,
    })
}

fn normalize_root(root: &Path) -> Result<PathBuf, BootstrapError> {
    let root_path = if root.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        root.to_path_buf()
    };

    if root_path.exists() {
        if !root_path.is_dir() {
            return Err(invalid(format!(
                "Runtime root is not a directory: {}",
                root_path.display()
            )));
        }
        return Ok(root_path);
    }

    fs::create_dir_all(&root_path)?;
    log_action(format!(
        "created runtime root directory {}",
        root_path.display()
    ));
    Ok(root_path)
}

/// Sulu entries found in the root.
fn verify_root_entries(root: &Path) -> Result<Vec<&'static str>, BootstrapError> {
    let mut present = Vec::new();
    let mut unexpected = Vec::new();
    let mut wrong_kind = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let Some((known, kind)) = SULU_LAYOUT
            .iter()
            .find(|(known, _)| *known == name.as_ref())
        else {
            unexpected.push(name.into_owned());
            continue;
        };
        let is_dir = entry.file_type()?.is_dir();
        if is_dir != (*kind == EntryKind::Dir) {
            wrong_kind.push(*known);
            continue;
        }
        present.push(*known);
    }

    if !wrong_kind.is_empty() {
        wrong_kind.sort();
        return Err(invalid(format!(
            "Runtime root '{}' has entries of the wrong kind: {}",
            root.display(),
            wrong_kind.join(", ")
        )));
    }
    if !unexpected.is_empty() {
        unexpected.sort();
        let expected: Vec<&str> = SULU_LAYOUT.iter().map(|(name, _)| *name).collect();
        return Err(invalid(format!(
            "Runtime root '{}' contains unexpected entries: {}. Expected only: {}.",
            root.display(),
            unexpected.join(", "),
            expected.join(", ")
        )));
    }
    Ok(present)
}

fn invalid(message: String) -> BootstrapError {
    BootstrapError::Io(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_fixtures::TestFixtureRoot;

    #[test]
    fn empty_root_is_fresh_not_partial() {
        let fixture = TestFixtureRoot::new_unique("root-fresh").unwrap();
        let inspection = inspect_root(fixture.path()).unwrap();
        assert!(inspection.missing_dirs.is_empty());
    }

    #[test]
    fn partial_root_lists_missing_directories() {
        let fixture = TestFixtureRoot::new_unique("root-partial").unwrap();
        fixture.write_file("config.yaml", "server: {}\n").unwrap();
        fs::create_dir_all(fixture.webspaces_dir()).unwrap();
        fs::create_dir_all(fixture.state_dir()).unwrap();

        let inspection = inspect_root(fixture.path()).unwrap();
        assert_eq!(inspection.missing_dirs, vec!["templates", "cache"]);
    }

    #[test]
    fn file_in_place_of_directory_is_rejected() {
        let fixture = TestFixtureRoot::new_unique("root-wrong-kind").unwrap();
        fixture.write_file("webspaces", "not a directory").unwrap();

        let message = inspect_root(fixture.path()).unwrap_err().to_string();
        assert!(message.contains("wrong kind"));
        assert!(message.contains("webspaces"));
    }

    #[test]
    fn missing_root_is_created() {
        let fixture = TestFixtureRoot::new_unique("root-create").unwrap();
        let nested = fixture.path().join("site");
        let inspection = inspect_root(&nested).unwrap();
        assert_eq!(inspection.root, nested);
        assert!(nested.is_dir());
    }
}
