// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::Environment;
use serde::Serialize;
use std::collections::BTreeMap;

/// A language with optional country, e.g. `de` or `de_at`. Children fall back to
/// their parent when content is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Localization {
    pub language: String,
    pub country: Option<String>,
    pub shadow: Option<String>,
    pub default: bool,
    pub children: Vec<Localization>,
}

impl Localization {
    pub fn new(language: &str, country: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: country.map(|value| value.to_ascii_lowercase()),
            shadow: None,
            default: false,
            children: Vec::new(),
        }
    }

    /// `language` or `language_country`.
    pub fn locale(&self) -> String {
        match &self.country {
            Some(country) => format!("{}_{}", self.language, country),
            None => self.language.clone(),
        }
    }

    /// This localization followed by all descendants, depth first.
    pub fn flatten(&self) -> Vec<&Localization> {
        let mut result = vec![self];
        for child in &self.children {
            result.extend(child.flatten());
        }
        result
    }

    /// Copy without children, used where the tree shape does not matter.
    pub fn detached(&self) -> Localization {
        Localization {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// Normalizes `de-AT`, `DE_at` and friends to `de_at`.
pub fn normalize_locale(raw: &str) -> String {
    raw.trim().replace('-', "_").to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Url {
    pub pattern: String,
    pub main: bool,
    pub language: Option<String>,
    pub country: Option<String>,
    pub redirect: Option<String>,
}

impl Url {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            main: false,
            language: None,
            country: None,
            redirect: None,
        }
    }

    /// Locale pinned by the `language`/`country` attributes, if any.
    pub fn explicit_locale(&self) -> Option<String> {
        let language = self.language.as_ref()?;
        Some(match &self.country {
            Some(country) => format!("{}_{}", language, country),
            None => language.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalEnvironment {
    pub environment: Environment,
    pub urls: Vec<Url>,
}

impl PortalEnvironment {
    pub fn main_url(&self) -> Option<&Url> {
        self.urls.iter().find(|url| url.main)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portal {
    pub key: String,
    pub name: String,
    pub webspace_key: String,
    /// Flat list; portals do not carry the fallback tree.
    pub localizations: Vec<Localization>,
    pub environments: Vec<PortalEnvironment>,
}

impl Portal {
    pub fn environment(&self, environment: Environment) -> Option<&PortalEnvironment> {
        self.environments
            .iter()
            .find(|candidate| candidate.environment == environment)
    }

    pub fn default_localization(&self) -> Option<&Localization> {
        self.localizations
            .iter()
            .find(|localization| localization.default)
            .or_else(|| self.localizations.first())
    }

    pub fn localization(&self, locale: &str) -> Option<&Localization> {
        let locale = normalize_locale(locale);
        self.localizations
            .iter()
            .find(|localization| localization.locale() == locale)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Webspace {
    pub key: String,
    pub name: String,
    pub theme: Option<String>,
    /// Root localizations; children hang below their parent.
    pub localizations: Vec<Localization>,
    pub portals: Vec<Portal>,
    /// Default structure type per document type, e.g. `page -> default`.
    pub default_templates: BTreeMap<String, String>,
    pub resource_locator_strategy: String,
}

impl Webspace {
    pub fn all_localizations(&self) -> Vec<&Localization> {
        self.localizations
            .iter()
            .flat_map(|localization| localization.flatten())
            .collect()
    }

    pub fn localization(&self, locale: &str) -> Option<&Localization> {
        let locale = normalize_locale(locale);
        self.all_localizations()
            .into_iter()
            .find(|localization| localization.locale() == locale)
    }

    pub fn default_localization(&self) -> Option<&Localization> {
        let all = self.all_localizations();
        all.iter()
            .find(|localization| localization.default)
            .copied()
            .or_else(|| all.first().copied())
    }

    /// Ancestors of `locale`, nearest first. Empty for roots and unknown locales.
    pub fn localization_parents(&self, locale: &str) -> Vec<&Localization> {
        fn walk<'a>(
            nodes: &'a [Localization],
            locale: &str,
            trail: &mut Vec<&'a Localization>,
        ) -> bool {
            for node in nodes {
                if node.locale() == locale {
                    return true;
                }
                trail.push(node);
                if walk(&node.children, locale, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }

        let locale = normalize_locale(locale);
        let mut trail = Vec::new();
        if walk(&self.localizations, &locale, &mut trail) {
            trail.reverse();
            trail
        } else {
            Vec::new()
        }
    }

    pub fn portal(&self, key: &str) -> Option<&Portal> {
        self.portals.iter().find(|portal| portal.key == key)
    }

    pub fn default_template(&self, document_type: &str) -> Option<&str> {
        self.default_templates
            .get(document_type)
            .map(|value| value.as_str())
    }
}

/// How a request URL relates to a configured portal URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// URL fixes webspace, portal and locale.
    Full,
    /// URL fixes webspace and portal only; redirect to the default-locale URL.
    Partial,
    /// URL is configured as a redirect to another URL.
    Redirect,
    None,
}

impl MatchType {
    pub fn priority(&self) -> u8 {
        match self {
            MatchType::Full => 3,
            MatchType::Partial => 2,
            MatchType::Redirect => 1,
            MatchType::None => 0,
        }
    }
}

/// One concrete URL a portal answers on, after placeholder expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalInformation {
    pub match_type: MatchType,
    pub environment: Environment,
    pub webspace_key: String,
    pub portal_key: String,
    pub localization: Option<Localization>,
    /// Pattern after locale expansion; `{host}` and `*` remain wildcards.
    pub url: String,
    pub redirect: Option<String>,
    pub main: bool,
    /// Position in configuration order, used as the final tie-breaker.
    pub order: usize,
}

impl PortalInformation {
    pub fn locale(&self) -> Option<String> {
        self.localization.as_ref().map(|localization| localization.locale())
    }

    /// Path part of the URL, i.e. the resource locator prefix.
    pub fn prefix(&self) -> &str {
        match self.url.find('/') {
            Some(index) => &self.url[index..],
            None => "",
        }
    }

    pub fn host(&self) -> &str {
        match self.url.find('/') {
            Some(index) => &self.url[..index],
            None => &self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Webspace {
        let mut de = Localization::new("de", None);
        let mut de_at = Localization::new("de", Some("at"));
        de_at.children.push(Localization::new("de", Some("vienna")));
        de.children.push(de_at);
        let mut en = Localization::new("en", None);
        en.default = true;
        en.children.push(de);

        Webspace {
            key: "sulu_io".to_string(),
            name: "Sulu".to_string(),
            theme: None,
            localizations: vec![en, Localization::new("fr", None)],
            portals: Vec::new(),
            default_templates: BTreeMap::new(),
            resource_locator_strategy: "tree_leaf_edit".to_string(),
        }
    }

    #[test]
    fn locale_joins_language_and_country() {
        assert_eq!(Localization::new("DE", Some("AT")).locale(), "de_at");
        assert_eq!(Localization::new("en", None).locale(), "en");
        assert_eq!(normalize_locale("de-AT"), "de_at");
    }

    #[test]
    fn webspace_finds_nested_localizations() {
        let webspace = tree();
        assert_eq!(webspace.all_localizations().len(), 5);
        assert!(webspace.localization("de_vienna").is_some());
        assert_eq!(
            webspace.default_localization().map(|l| l.locale()),
            Some("en".to_string())
        );
    }

    #[test]
    fn parents_are_listed_nearest_first() {
        let webspace = tree();
        let parents: Vec<String> = webspace
            .localization_parents("de_vienna")
            .into_iter()
            .map(|l| l.locale())
            .collect();
        assert_eq!(parents, vec!["de_at", "de", "en"]);
        assert!(webspace.localization_parents("fr").is_empty());
    }

    #[test]
    fn portal_information_splits_host_and_prefix() {
        let info = PortalInformation {
            match_type: MatchType::Full,
            environment: Environment::Prod,
            webspace_key: "sulu_io".to_string(),
            portal_key: "sulu_io".to_string(),
            localization: None,
            url: "sulu.io/en".to_string(),
            redirect: None,
            main: true,
            order: 0,
        };
        assert_eq!(info.host(), "sulu.io");
        assert_eq!(info.prefix(), "/en");
    }
}
