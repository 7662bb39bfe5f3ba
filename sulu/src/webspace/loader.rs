// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::WebspaceError;
use super::model::{Localization, Portal, PortalEnvironment, Url, Webspace, normalize_locale};
use crate::config::Environment;
use crate::xml::{XmlElement, parse_document};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_RESOURCE_LOCATOR_STRATEGY: &str = "tree_leaf_edit";

/// Reads every `*.xml` file in `dir`, in file-name order.
pub fn load_webspaces(dir: &Path) -> Result<Vec<Webspace>, WebspaceError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|err| WebspaceError::Io(format!("{}: {}", dir.display(), err)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("xml")
        })
        .collect();
    files.sort();

    let mut webspaces = Vec::with_capacity(files.len());
    for file in files {
        let content = fs::read_to_string(&file)
            .map_err(|err| WebspaceError::Io(format!("{}: {}", file.display(), err)))?;
        let webspace = parse_webspace(&content, &file.display().to_string())?;
        debug!(
            "Loaded webspace '{}' from {}",
            webspace.key,
            file.display()
        );
        webspaces.push(webspace);
    }
    Ok(webspaces)
}

/// Parses one webspace document. `source` names the origin in error messages.
pub fn parse_webspace(content: &str, source: &str) -> Result<Webspace, WebspaceError> {
    let root = parse_document(content).map_err(|err| WebspaceError::InvalidXml {
        source: source.to_string(),
        message: err.to_string(),
    })?;
    let invalid = |message: String| WebspaceError::Invalid {
        source: source.to_string(),
        message,
    };
    let xml = |err: crate::xml::XmlError| WebspaceError::InvalidXml {
        source: source.to_string(),
        message: err.to_string(),
    };

    if root.name != "webspace" {
        return Err(invalid(format!(
            "root element must be <webspace>, got <{}>",
            root.name
        )));
    }

    let key = root
        .child_text("key")
        .ok_or_else(|| invalid("webspace <key> is required".to_string()))?
        .to_string();
    let name = root.child_text("name").unwrap_or(&key).to_string();
    let theme = root.child_text("theme").map(|value| value.to_string());

    let mut localizations = Vec::new();
    if let Some(node) = root.child("localizations") {
        for child in node.children_named("localization") {
            localizations.push(parse_localization(child).map_err(xml)?);
        }
    }
    if localizations.is_empty() {
        return Err(invalid(format!(
            "webspace '{}' must define at least one localization",
            key
        )));
    }
    normalize_default_localization(&key, &mut localizations).map_err(invalid)?;
    ensure_unique_locales(&key, &localizations).map_err(invalid)?;

    let mut default_templates = BTreeMap::new();
    if let Some(node) = root.child("default-templates") {
        for template in node.children_named("default-template") {
            let document_type = template.attr("type").ok_or_else(|| {
                invalid("<default-template> requires a 'type' attribute".to_string())
            })?;
            default_templates.insert(document_type.to_string(), template.text().to_string());
        }
    }

    let resource_locator_strategy = root
        .child("resource-locator")
        .and_then(|node| node.child_text("strategy"))
        .unwrap_or(DEFAULT_RESOURCE_LOCATOR_STRATEGY)
        .to_string();

    let mut webspace = Webspace {
        key: key.clone(),
        name,
        theme,
        localizations,
        portals: Vec::new(),
        default_templates,
        resource_locator_strategy,
    };

    let mut portals = Vec::new();
    if let Some(node) = root.child("portals") {
        for portal in node.children_named("portal") {
            portals.push(parse_portal(portal, &webspace).map_err(|err| match err {
                PortalParseError::Xml(err) => xml(err),
                PortalParseError::Invalid(message) => invalid(message),
            })?);
        }
    }
    if portals.is_empty() {
        return Err(invalid(format!(
            "webspace '{}' must define at least one portal",
            key
        )));
    }
    webspace.portals = portals;

    Ok(webspace)
}

fn parse_localization(node: &XmlElement) -> Result<Localization, crate::xml::XmlError> {
    let language = node.attr("language").ok_or_else(|| {
        crate::xml::XmlError::new("<localization> requires a 'language' attribute")
    })?;
    let mut localization = Localization::new(language, node.attr("country"));
    localization.shadow = node.attr("shadow").map(|value| value.to_string());
    localization.default = node.bool_attr("default")?.unwrap_or(false);
    for child in node.children_named("localization") {
        localization.children.push(parse_localization(child)?);
    }
    Ok(localization)
}

/// Exactly one default: none flagged promotes the first root, more than one is an error.
fn normalize_default_localization(
    key: &str,
    localizations: &mut [Localization],
) -> Result<(), String> {
    let defaults = localizations
        .iter()
        .flat_map(|localization| localization.flatten())
        .filter(|localization| localization.default)
        .count();
    match defaults {
        0 => {
            if let Some(first) = localizations.first_mut() {
                first.default = true;
            }
            Ok(())
        }
        1 => Ok(()),
        count => Err(format!(
            "webspace '{}' flags {} default localizations, expected one",
            key, count
        )),
    }
}

fn ensure_unique_locales(key: &str, localizations: &[Localization]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for localization in localizations.iter().flat_map(|l| l.flatten()) {
        if !seen.insert(localization.locale()) {
            return Err(format!(
                "webspace '{}' defines locale '{}' more than once",
                key,
                localization.locale()
            ));
        }
    }
    Ok(())
}

enum PortalParseError {
    Xml(crate::xml::XmlError),
    Invalid(String),
}

impl From<crate::xml::XmlError> for PortalParseError {
    fn from(err: crate::xml::XmlError) -> Self {
        PortalParseError::Xml(err)
    }
}

fn parse_portal(node: &XmlElement, webspace: &Webspace) -> Result<Portal, PortalParseError> {
    let key = node
        .child_text("key")
        .ok_or_else(|| {
            PortalParseError::Invalid(format!(
                "portal in webspace '{}' requires a <key>",
                webspace.key
            ))
        })?
        .to_string();
    let name = node.child_text("name").unwrap_or(&key).to_string();

    let localizations = match node.child("localizations") {
        Some(list) => {
            let mut result = Vec::new();
            for child in list.children_named("localization") {
                let requested = parse_localization(child)?;
                let known = webspace.localization(&requested.locale()).ok_or_else(|| {
                    PortalParseError::Invalid(format!(
                        "portal '{}' uses locale '{}' which webspace '{}' does not define",
                        key,
                        requested.locale(),
                        webspace.key
                    ))
                })?;
                let mut localization = known.detached();
                localization.default = requested.default;
                result.push(localization);
            }
            result
        }
        None => webspace
            .all_localizations()
            .into_iter()
            .map(|localization| localization.detached())
            .collect(),
    };
    let localizations = normalize_portal_defaults(&key, localizations, webspace)
        .map_err(PortalParseError::Invalid)?;

    let mut environments = Vec::new();
    if let Some(list) = node.child("environments") {
        for environment_node in list.children_named("environment") {
            let raw_type = environment_node.attr("type").unwrap_or("");
            let environment = Environment::parse(raw_type).ok_or_else(|| {
                PortalParseError::Invalid(format!(
                    "portal '{}' has unknown environment type '{}'",
                    key, raw_type
                ))
            })?;
            if environments
                .iter()
                .any(|existing: &PortalEnvironment| existing.environment == environment)
            {
                return Err(PortalParseError::Invalid(format!(
                    "portal '{}' defines environment '{}' twice",
                    key, environment
                )));
            }
            let urls = parse_urls(environment_node, &key, environment, &localizations)?;
            environments.push(PortalEnvironment { environment, urls });
        }
    }
    if environments.is_empty() {
        return Err(PortalParseError::Invalid(format!(
            "portal '{}' must define at least one environment",
            key
        )));
    }

    Ok(Portal {
        key,
        name,
        webspace_key: webspace.key.clone(),
        localizations,
        environments,
    })
}

fn normalize_portal_defaults(
    key: &str,
    mut localizations: Vec<Localization>,
    webspace: &Webspace,
) -> Result<Vec<Localization>, String> {
    let defaults = localizations.iter().filter(|l| l.default).count();
    if defaults > 1 {
        return Err(format!(
            "portal '{}' flags {} default localizations, expected one",
            key, defaults
        ));
    }
    if defaults == 0 {
        let webspace_default = webspace.default_localization().map(|l| l.locale());
        let index = localizations
            .iter()
            .position(|l| Some(l.locale()) == webspace_default)
            .unwrap_or(0);
        if let Some(localization) = localizations.get_mut(index) {
            localization.default = true;
        }
    }
    Ok(localizations)
}

fn parse_urls(
    environment_node: &XmlElement,
    portal_key: &str,
    environment: Environment,
    localizations: &[Localization],
) -> Result<Vec<Url>, PortalParseError> {
    let mut urls = Vec::new();
    if let Some(list) = environment_node.child("urls") {
        for url_node in list.children_named("url") {
            let pattern = url_node.text().to_ascii_lowercase();
            if pattern.is_empty() {
                return Err(PortalParseError::Invalid(format!(
                    "portal '{}' ({}) has an empty <url>",
                    portal_key, environment
                )));
            }
            let mut url = Url::new(&pattern);
            url.main = url_node.bool_attr("main")?.unwrap_or(false);
            url.language = url_node.attr("language").map(normalize_locale);
            url.country = url_node.attr("country").map(normalize_locale);
            url.redirect = url_node
                .attr("redirect")
                .map(|value| value.trim().to_ascii_lowercase());
            if let Some(locale) = url.explicit_locale()
                && !localizations.iter().any(|l| l.locale() == locale)
            {
                return Err(PortalParseError::Invalid(format!(
                    "portal '{}' ({}) url '{}' uses unknown locale '{}'",
                    portal_key, environment, pattern, locale
                )));
            }
            urls.push(url);
        }
    }

    if urls.is_empty() {
        return Err(PortalParseError::Invalid(format!(
            "portal '{}' ({}) must define at least one url",
            portal_key, environment
        )));
    }

    match urls.iter().filter(|url| url.main).count() {
        0 => urls[0].main = true,
        1 => {}
        count => {
            return Err(PortalParseError::Invalid(format!(
                "portal '{}' ({}) flags {} main urls, expected one",
                portal_key, environment, count
            )));
        }
    }

    Ok(urls)
}
