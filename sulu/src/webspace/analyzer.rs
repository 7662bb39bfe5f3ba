// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::manager::WebspaceManager;
use super::model::{Localization, MatchType};
use super::url::{PLACEHOLDER_HOST, replace_host};
use crate::config::Environment;
use serde::Serialize;
use std::sync::Arc;

/// What a request URL means in terms of webspace, portal and locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestAnalysis {
    pub match_type: MatchType,
    pub webspace_key: Option<String>,
    pub portal_key: Option<String>,
    pub localization: Option<Localization>,
    /// Path below the portal prefix, `/` when empty.
    pub resource_locator: String,
    pub resource_locator_prefix: String,
    pub portal_url: Option<String>,
    /// Where `Partial` and `Redirect` matches send the client (no scheme).
    pub redirect: Option<String>,
}

impl RequestAnalysis {
    fn none(resource_locator: String) -> Self {
        Self {
            match_type: MatchType::None,
            webspace_key: None,
            portal_key: None,
            localization: None,
            resource_locator,
            resource_locator_prefix: String::new(),
            portal_url: None,
            redirect: None,
        }
    }

    pub fn locale(&self) -> Option<String> {
        self.localization.as_ref().map(|l| l.locale())
    }
}

#[derive(Clone)]
pub struct RequestAnalyzer {
    manager: Arc<WebspaceManager>,
}

impl RequestAnalyzer {
    pub fn new(manager: Arc<WebspaceManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &WebspaceManager {
        &self.manager
    }

    pub fn analyze(&self, host: &str, path: &str, environment: Environment) -> RequestAnalysis {
        let host = host.trim().to_ascii_lowercase();
        let path = normalize_path(path);
        let request_url = format!("{}{}", host, path);

        let Some(found) = self
            .manager
            .find_portal_information_by_url(&request_url, environment)
        else {
            return RequestAnalysis::none(path);
        };
        let information = found.information;

        let matched = &request_url[..found.matched_len];
        let prefix = matched
            .find('/')
            .map(|index| matched[index..].to_string())
            .unwrap_or_default();
        let remainder = &request_url[found.matched_len..];
        let resource_locator = normalize_resource_locator(remainder);

        let redirect = match information.match_type {
            MatchType::Partial | MatchType::Redirect => {
                information.redirect.as_ref().map(|target| {
                    let target = if target.contains(PLACEHOLDER_HOST) {
                        replace_host(target, &host)
                    } else {
                        target.clone()
                    };
                    if resource_locator == "/" {
                        target
                    } else {
                        format!("{}{}", target.trim_end_matches('/'), resource_locator)
                    }
                })
            }
            _ => None,
        };

        RequestAnalysis {
            match_type: information.match_type,
            webspace_key: Some(information.webspace_key.clone()),
            portal_key: Some(information.portal_key.clone()),
            localization: information.localization.clone(),
            resource_locator,
            resource_locator_prefix: prefix,
            portal_url: Some(matched.to_string()),
            redirect,
        }
    }
}

/// Leading slash, no query or fragment.
fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn normalize_resource_locator(remainder: &str) -> String {
    let trimmed = remainder.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webspace::manager::tests::manager;

    fn analyzer() -> RequestAnalyzer {
        RequestAnalyzer::new(Arc::new(manager()))
    }

    #[test]
    fn full_match_splits_prefix_and_resource_locator() {
        let analysis = analyzer().analyze("Sulu.io", "/de-at/news/today?x=1", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::Full);
        assert_eq!(analysis.webspace_key.as_deref(), Some("sulu_io"));
        assert_eq!(analysis.portal_key.as_deref(), Some("sulu_io"));
        assert_eq!(analysis.locale().as_deref(), Some("de_at"));
        assert_eq!(analysis.resource_locator_prefix, "/de-at");
        assert_eq!(analysis.resource_locator, "/news/today");
        assert_eq!(analysis.redirect, None);
    }

    #[test]
    fn homepage_has_root_resource_locator() {
        let analysis = analyzer().analyze("sulu.io", "/en/", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::Full);
        assert_eq!(analysis.resource_locator, "/");
    }

    #[test]
    fn partial_match_redirects_to_default_locale() {
        let analysis = analyzer().analyze("sulu.io", "/about", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::Partial);
        assert_eq!(analysis.redirect.as_deref(), Some("sulu.io/en/about"));

        let root = analyzer().analyze("sulu.io", "/", Environment::Prod);
        assert_eq!(root.redirect.as_deref(), Some("sulu.io/en"));
    }

    #[test]
    fn redirect_url_keeps_remainder() {
        let analysis = analyzer().analyze("www.sulu.io", "/en/about", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::Redirect);
        assert_eq!(analysis.redirect.as_deref(), Some("sulu.io/en/about"));
    }

    #[test]
    fn host_placeholder_matches_any_host() {
        let analysis = analyzer().analyze("localhost:8000", "/preview/de/kontakt", Environment::Dev);
        assert_eq!(analysis.match_type, MatchType::Full);
        assert_eq!(analysis.locale().as_deref(), Some("de"));
        assert_eq!(analysis.resource_locator_prefix, "/preview/de");
        assert_eq!(analysis.resource_locator, "/kontakt");
    }

    #[test]
    fn unknown_host_is_no_match() {
        let analysis = analyzer().analyze("example.com", "/en", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::None);
        assert_eq!(analysis.webspace_key, None);
        assert_eq!(analysis.resource_locator, "/en");
    }

    #[test]
    fn environments_are_separate() {
        let analysis = analyzer().analyze("sulu.lo", "/en", Environment::Prod);
        assert_eq!(analysis.match_type, MatchType::None);
        let analysis = analyzer().analyze("sulu.lo", "/en", Environment::Dev);
        assert_eq!(analysis.match_type, MatchType::Full);
    }
}
