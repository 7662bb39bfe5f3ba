// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use env_logger::Logger;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

/// Rewrites record levels per target prefix before handing them to env_logger.
struct LevelModifierLogger {
    inner: Logger,
    rules: Vec<(String, Level, Level)>,
}

impl LevelModifierLogger {
    fn new(inner: Logger, rules: Vec<(String, Level, Level)>) -> Self {
        LevelModifierLogger { inner, rules }
    }

    fn get_new_level(&self, target: &str, original_level: Level) -> Level {
        self.rules
            .iter()
            .find(|(prefix, from, _)| target.starts_with(prefix.as_str()) && *from == original_level)
            .map(|(_, _, to)| *to)
            .unwrap_or(original_level)
    }
}

impl Log for LevelModifierLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let new_metadata = Metadata::builder()
            .level(self.get_new_level(metadata.target(), metadata.level()))
            .target(metadata.target())
            .build();
        self.inner.enabled(&new_metadata)
    }

    fn log(&self, record: &Record) {
        let new_record = Record::builder()
            .level(self.get_new_level(record.target(), record.level()))
            .target(record.target())
            .args(*record.args())
            .module_path(record.module_path())
            .file(record.file())
            .line(record.line())
            .build();
        self.inner.log(&new_record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Installs the process logger: timestamped lines on stdout, with actix worker
/// chatter demoted from info to debug.
pub fn init_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .build();

    let rules = vec![
        ("actix_server".to_string(), Level::Info, Level::Debug),
        ("actix_ws".to_string(), Level::Debug, Level::Trace),
    ];
    log::set_boxed_logger(Box::new(LevelModifierLogger::new(logger, rules)))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
