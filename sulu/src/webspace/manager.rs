// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::WebspaceError;
use super::loader::load_webspaces;
use super::model::{Localization, MatchType, Portal, PortalInformation, Url, Webspace};
use super::url::{self as url_pattern, UrlMatcher};
use crate::config::Environment;
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

struct Entry {
    information: PortalInformation,
    matcher: UrlMatcher,
}

/// A portal information together with how much of the request URL it covered.
#[derive(Debug, Clone, Copy)]
pub struct PortalMatch<'a> {
    pub information: &'a PortalInformation,
    pub matched_len: usize,
}

/// Owns all webspaces and the expanded portal URLs per environment.
pub struct WebspaceManager {
    webspaces: Vec<Webspace>,
    entries: BTreeMap<Environment, Vec<Entry>>,
}

impl WebspaceManager {
    pub fn load(dir: &Path) -> Result<Self, WebspaceError> {
        let webspaces = load_webspaces(dir)?;
        let manager = Self::new(webspaces)?;
        info!(
            "🌐 Loaded {} webspace(s) from {}",
            manager.webspaces.len(),
            dir.display()
        );
        Ok(manager)
    }

    pub fn new(webspaces: Vec<Webspace>) -> Result<Self, WebspaceError> {
        let mut webspace_keys = HashSet::new();
        let mut portal_keys = HashSet::new();
        for webspace in &webspaces {
            if !webspace_keys.insert(webspace.key.clone()) {
                return Err(WebspaceError::Invalid {
                    source: webspace.key.clone(),
                    message: format!("webspace key '{}' is used twice", webspace.key),
                });
            }
            for portal in &webspace.portals {
                if !portal_keys.insert(portal.key.clone()) {
                    return Err(WebspaceError::Invalid {
                        source: webspace.key.clone(),
                        message: format!("portal key '{}' is used twice", portal.key),
                    });
                }
            }
        }

        let mut entries: BTreeMap<Environment, Vec<Entry>> = BTreeMap::new();
        for information in build_portal_informations(&webspaces) {
            let matcher = UrlMatcher::new(&information.url).map_err(|err| {
                WebspaceError::Invalid {
                    source: information.webspace_key.clone(),
                    message: format!("url '{}' cannot be matched: {}", information.url, err),
                }
            })?;
            entries
                .entry(information.environment)
                .or_default()
                .push(Entry {
                    information,
                    matcher,
                });
        }
        for (environment, list) in &entries {
            debug!(
                "Built {} portal information(s) for environment {}",
                list.len(),
                environment
            );
        }

        Ok(Self { webspaces, entries })
    }

    pub fn webspaces(&self) -> &[Webspace] {
        &self.webspaces
    }

    pub fn find_webspace(&self, key: &str) -> Option<&Webspace> {
        self.webspaces.iter().find(|webspace| webspace.key == key)
    }

    pub fn find_portal(&self, key: &str) -> Option<&Portal> {
        self.webspaces
            .iter()
            .flat_map(|webspace| webspace.portals.iter())
            .find(|portal| portal.key == key)
    }

    pub fn portal_informations(&self, environment: Environment) -> Vec<&PortalInformation> {
        self.entries
            .get(&environment)
            .map(|list| list.iter().map(|entry| &entry.information).collect())
            .unwrap_or_default()
    }

    /// Most specific portal information for `url` (`host[:port]/path`).
    pub fn find_portal_information_by_url(
        &self,
        url: &str,
        environment: Environment,
    ) -> Option<PortalMatch<'_>> {
        let list = self.entries.get(&environment)?;
        list.iter()
            .filter_map(|entry| {
                entry.matcher.match_len(url).map(|matched_len| PortalMatch {
                    information: &entry.information,
                    matched_len,
                })
            })
            .max_by(compare_matches)
    }

    /// Full entries of `webspace` in `locale`, main URL first.
    pub fn find_portal_informations_by_webspace_and_locale(
        &self,
        webspace: &str,
        locale: &str,
        environment: Environment,
    ) -> Vec<&PortalInformation> {
        let locale = super::model::normalize_locale(locale);
        let mut result: Vec<&PortalInformation> = self
            .portal_informations(environment)
            .into_iter()
            .filter(|information| {
                information.match_type == MatchType::Full
                    && information.webspace_key == webspace
                    && information.locale().as_deref() == Some(locale.as_str())
            })
            .collect();
        result.sort_by(|a, b| b.main.cmp(&a.main).then(a.order.cmp(&b.order)));
        result
    }

    /// Absolute URL of `resource_locator` on the main URL of `webspace` in `locale`.
    /// `{host}` patterns need `host`; wildcard hosts are skipped.
    pub fn find_url_by_resource_locator(
        &self,
        resource_locator: &str,
        environment: Environment,
        locale: &str,
        webspace: &str,
        host: Option<&str>,
        scheme: &str,
    ) -> Option<String> {
        self.find_portal_informations_by_webspace_and_locale(webspace, locale, environment)
            .into_iter()
            .find_map(|information| {
                let base = if information.url.contains(url_pattern::PLACEHOLDER_HOST) {
                    url_pattern::replace_host(&information.url, host?)
                } else {
                    information.url.clone()
                };
                if base.contains('*') {
                    return None;
                }
                Some(join_url(scheme, &base, resource_locator))
            })
    }
}

fn join_url(scheme: &str, base: &str, resource_locator: &str) -> String {
    let path = if resource_locator.is_empty() || resource_locator == "/" {
        if base.contains('/') { "" } else { "/" }
    } else {
        resource_locator
    };
    format!("{}://{}{}", scheme, base, path)
}

fn compare_matches(a: &PortalMatch<'_>, b: &PortalMatch<'_>) -> Ordering {
    a.matched_len
        .cmp(&b.matched_len)
        .then_with(|| a.information.url.len().cmp(&b.information.url.len()))
        .then_with(|| {
            a.information
                .match_type
                .priority()
                .cmp(&b.information.match_type.priority())
        })
        .then_with(|| a.information.main.cmp(&b.information.main))
        // Earlier configuration wins, so a lower order compares greater.
        .then_with(|| b.information.order.cmp(&a.information.order))
}

fn build_portal_informations(webspaces: &[Webspace]) -> Vec<PortalInformation> {
    let mut result = Vec::new();
    for webspace in webspaces {
        for portal in &webspace.portals {
            let default = portal.default_localization();
            for environment in &portal.environments {
                for url in &environment.urls {
                    expand_url(
                        &mut result,
                        webspace,
                        portal,
                        environment.environment,
                        url,
                        default,
                    );
                }
            }
        }
    }
    result
}

fn expand_url(
    result: &mut Vec<PortalInformation>,
    webspace: &Webspace,
    portal: &Portal,
    environment: Environment,
    url: &Url,
    default: Option<&Localization>,
) {
    let mut push = |match_type: MatchType,
                    localization: Option<&Localization>,
                    expanded: String,
                    redirect: Option<String>,
                    main: bool| {
        let order = result.len();
        result.push(PortalInformation {
            match_type,
            environment,
            webspace_key: webspace.key.clone(),
            portal_key: portal.key.clone(),
            localization: localization.map(|l| l.detached()),
            url: expanded,
            redirect,
            main,
            order,
        });
    };

    if let Some(target) = &url.redirect {
        push(
            MatchType::Redirect,
            default,
            url_pattern::cleanup(&url.pattern),
            Some(target.clone()),
            url.main,
        );
        return;
    }

    if let Some(locale) = url.explicit_locale() {
        let localization = portal.localization(&locale);
        let expanded = match localization {
            Some(localization) => url_pattern::replace_locale(&url.pattern, localization),
            None => url_pattern::cleanup(&url.pattern),
        };
        push(MatchType::Full, localization, expanded, None, url.main);
        return;
    }

    if url_pattern::has_locale_placeholder(&url.pattern) {
        for localization in &portal.localizations {
            push(
                MatchType::Full,
                Some(localization),
                url_pattern::replace_locale(&url.pattern, localization),
                None,
                url.main,
            );
        }
        let redirect = default.map(|localization| url_pattern::replace_locale(&url.pattern, localization));
        push(
            MatchType::Partial,
            default,
            url_pattern::cleanup(&url.pattern),
            redirect,
            false,
        );
        return;
    }

    push(
        MatchType::Full,
        default,
        url_pattern::cleanup(&url.pattern),
        None,
        url.main,
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::webspace::loader::parse_webspace;

    pub(crate) const SULU_IO: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<webspace>
    <name>Sulu CMF</name>
    <key>sulu_io</key>
    <localizations>
        <localization language="en" default="true"/>
        <localization language="de">
            <localization language="de" country="at"/>
        </localization>
    </localizations>
    <portals>
        <portal>
            <name>Sulu CMF</name>
            <key>sulu_io</key>
            <environments>
                <environment type="prod">
                    <urls>
                        <url>sulu.io/{localization}</url>
                        <url redirect="sulu.io">www.sulu.io</url>
                    </urls>
                </environment>
                <environment type="dev">
                    <urls>
                        <url>sulu.lo/{localization}</url>
                        <url language="de" country="at">sulu-at.lo</url>
                        <url>{host}/preview/{localization}</url>
                    </urls>
                </environment>
            </environments>
        </portal>
    </portals>
</webspace>"#;

    pub(crate) fn manager() -> WebspaceManager {
        let webspace = parse_webspace(SULU_IO, "sulu_io.xml").expect("valid webspace");
        WebspaceManager::new(vec![webspace]).expect("manager")
    }

    #[test]
    fn expands_locale_placeholders_into_full_and_partial_entries() {
        let manager = manager();
        let prod = manager.portal_informations(Environment::Prod);
        let summary: Vec<(MatchType, &str, Option<String>)> = prod
            .iter()
            .map(|info| (info.match_type, info.url.as_str(), info.locale()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (MatchType::Full, "sulu.io/en", Some("en".to_string())),
                (MatchType::Full, "sulu.io/de", Some("de".to_string())),
                (MatchType::Full, "sulu.io/de-at", Some("de_at".to_string())),
                (MatchType::Partial, "sulu.io", Some("en".to_string())),
                (MatchType::Redirect, "www.sulu.io", Some("en".to_string())),
            ]
        );
        assert_eq!(prod[3].redirect.as_deref(), Some("sulu.io/en"));
    }

    #[test]
    fn longest_match_wins() {
        let manager = manager();
        let found = manager
            .find_portal_information_by_url("sulu.io/de-at/news", Environment::Prod)
            .expect("match");
        assert_eq!(found.information.locale().as_deref(), Some("de_at"));
        assert_eq!(found.matched_len, "sulu.io/de-at".len());

        let partial = manager
            .find_portal_information_by_url("sulu.io/news", Environment::Prod)
            .expect("match");
        assert_eq!(partial.information.match_type, MatchType::Partial);

        assert!(
            manager
                .find_portal_information_by_url("example.com/en", Environment::Prod)
                .is_none()
        );
    }

    #[test]
    fn every_main_url_resolves_as_full() {
        let manager = manager();
        for environment in [Environment::Prod, Environment::Dev] {
            for info in manager.portal_informations(environment) {
                if info.match_type != MatchType::Full || !info.main {
                    continue;
                }
                let url = url_pattern::replace_host(&info.url, "localhost");
                let found = manager
                    .find_portal_information_by_url(&url, environment)
                    .expect("main url matches");
                assert_eq!(found.information.match_type, MatchType::Full);
                assert_eq!(found.information.webspace_key, "sulu_io");
                assert_eq!(found.information.locale(), info.locale());
            }
        }
    }

    #[test]
    fn builds_absolute_urls_for_resource_locators() {
        let manager = manager();
        assert_eq!(
            manager.find_url_by_resource_locator(
                "/about",
                Environment::Prod,
                "de_at",
                "sulu_io",
                None,
                "https"
            ),
            Some("https://sulu.io/de-at/about".to_string())
        );
        assert_eq!(
            manager.find_url_by_resource_locator(
                "/",
                Environment::Prod,
                "en",
                "sulu_io",
                None,
                "http"
            ),
            Some("http://sulu.io/en".to_string())
        );
        assert_eq!(
            manager.find_url_by_resource_locator(
                "/about",
                Environment::Prod,
                "fr",
                "sulu_io",
                None,
                "http"
            ),
            None
        );
    }

    #[test]
    fn rejects_duplicate_webspace_keys() {
        let webspace = parse_webspace(SULU_IO, "a.xml").expect("valid webspace");
        assert!(WebspaceManager::new(vec![webspace.clone(), webspace]).is_err());
    }
}
