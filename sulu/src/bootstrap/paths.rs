// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use crate::config::ValidatedConfig;
use crate::runtime_paths::RuntimePaths;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub(super) const EXAMPLE_WEBSPACE_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/defaults/example.xml"
));
const DEFAULT_PAGE_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/defaults/default.xml"
));
const HOMEPAGE_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/bootstrap/defaults/homepage.xml"
));

/// Creates the runtime directories and seeds an example webspace and templates
/// when none exist yet.
pub fn ensure_paths(root: &Path, config: &ValidatedConfig) -> Result<RuntimePaths, BootstrapError> {
    let webspaces_dir = root.join(&config.webspaces.path);
    ensure_dir(&webspaces_dir)?;
    ensure_dir(&root.join(&config.cache.path))?;
    ensure_dir(&root.join("state"))?;
    for settings in config.structures.values() {
        for path in &settings.paths {
            ensure_dir(&root.join(path))?;
        }
    }

    if !has_xml(&webspaces_dir)? {
        let example = webspaces_dir.join("example.xml");
        if write_new_file(&example, EXAMPLE_WEBSPACE_XML)? {
            log_action(format!("created example webspace {}", example.display()));
        }
    }

    let runtime_paths =
        RuntimePaths::from_root(root, config).map_err(BootstrapError::Config)?;
    seed_template(&runtime_paths, "page", "default.xml", DEFAULT_PAGE_XML)?;
    seed_template(&runtime_paths, "home", "homepage.xml", HOMEPAGE_XML)?;
    Ok(runtime_paths)
}

fn seed_template(
    runtime_paths: &RuntimePaths,
    document_type: &str,
    file_name: &str,
    contents: &str,
) -> Result<(), BootstrapError> {
    let Some(dir) = runtime_paths
        .structure_paths
        .get(document_type)
        .and_then(|paths| paths.first())
    else {
        return Ok(());
    };
    if has_xml(dir)? {
        return Ok(());
    }
    let path = dir.join(file_name);
    if write_new_file(&path, contents)? {
        log_action(format!("created {} template {}", document_type, path.display()));
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<(), BootstrapError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(BootstrapError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a directory: {}", path.display()),
            )));
        }
        return Ok(());
    }

    fs::create_dir_all(path)?;
    log_action(format!("created directory {}", path.display()));
    Ok(())
}

fn has_xml(dir: &Path) -> Result<bool, BootstrapError> {
    if !dir.is_dir() {
        return Ok(false);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry.map_err(BootstrapError::Io)?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("xml") {
            return Ok(true);
        }
    }
    Ok(false)
}

fn write_new_file(path: &Path, contents: &str) -> Result<bool, BootstrapError> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(true)
}
