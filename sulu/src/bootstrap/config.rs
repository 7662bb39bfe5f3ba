// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{BootstrapError, log_action};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WORKERS: u16 = 4;

/// Writes `config.yaml` unless one exists. Returns whether it was created.
pub fn ensure_config(root: &Path) -> Result<bool, BootstrapError> {
    let config_path = root.join("config.yaml");
    if config_path.exists() {
        return Ok(false);
    }

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(BootstrapError::Io(err)),
    };

    file.write_all(default_config_yaml().as_bytes())?;
    file.sync_all()?;

    log_action(format!("created config.yaml (http port {})", DEFAULT_PORT));
    Ok(true)
}

fn default_config_yaml() -> String {
    format!(
        r#"server:
  host: "0.0.0.0"
  port: {port}
  workers: {workers}

admin:
  path: "/admin"

app:
  name: "Sulu"

logging:
  level: "info"

environment: "prod"

webspaces:
  path: "webspaces"

structures:
  page:
    paths: ["templates/pages"]
    required_properties: ["title"]
    required_tags: ["sulu.rlp"]
  home:
    paths: ["templates/home"]
    required_properties: ["title"]
    required_tags: ["sulu.rlp"]

cache:
  path: "cache"

collaboration:
  interval_seconds: 20
  threshold_seconds: 60
"#,
        port = DEFAULT_PORT,
        workers = DEFAULT_WORKERS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn default_config_parses_and_validates() {
        let config: Config = serde_yaml::from_str(&default_config_yaml()).unwrap();
        let validated = config.validate().expect("default config is valid");
        assert_eq!(validated.server.port, 8080);
        assert_eq!(validated.structures["page"].required_tags, vec!["sulu.rlp"]);
    }
}
