// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

pub mod analyzer;
pub mod loader;
pub mod locale;
pub mod manager;
pub mod model;
pub mod url;

pub use analyzer::{RequestAnalysis, RequestAnalyzer};
pub use locale::LocaleChooser;
pub use manager::WebspaceManager;
pub use model::{
    Localization, MatchType, Portal, PortalEnvironment, PortalInformation, Url, Webspace,
};

#[derive(Debug)]
pub enum WebspaceError {
    InvalidXml { source: String, message: String },
    Invalid { source: String, message: String },
    Io(String),
}

impl std::fmt::Display for WebspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebspaceError::InvalidXml { source, message } => {
                write!(f, "Invalid webspace XML in {}: {}", source, message)
            }
            WebspaceError::Invalid { source, message } => {
                write!(f, "Invalid webspace configuration in {}: {}", source, message)
            }
            WebspaceError::Io(message) => write!(f, "Webspace I/O error: {}", message),
        }
    }
}

impl std::error::Error for WebspaceError {}
