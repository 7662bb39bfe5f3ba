// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::model::Localization;
use regex::Regex;

pub const PLACEHOLDER_LOCALIZATION: &str = "{localization}";
pub const PLACEHOLDER_LANGUAGE: &str = "{language}";
pub const PLACEHOLDER_COUNTRY: &str = "{country}";
pub const PLACEHOLDER_HOST: &str = "{host}";

const LOCALE_PLACEHOLDERS: [&str; 3] = [
    PLACEHOLDER_LOCALIZATION,
    PLACEHOLDER_LANGUAGE,
    PLACEHOLDER_COUNTRY,
];

pub fn has_locale_placeholder(pattern: &str) -> bool {
    LOCALE_PLACEHOLDERS
        .iter()
        .any(|placeholder| pattern.contains(placeholder))
}

/// Fills the locale placeholders. `{localization}` uses the dashed URL form (`de-at`).
pub fn replace_locale(pattern: &str, localization: &Localization) -> String {
    let dashed = localization.locale().replace('_', "-");
    let replaced = pattern
        .replace(PLACEHOLDER_LOCALIZATION, &dashed)
        .replace(PLACEHOLDER_LANGUAGE, &localization.language)
        .replace(
            PLACEHOLDER_COUNTRY,
            localization.country.as_deref().unwrap_or(""),
        );
    tidy(&replaced)
}

pub fn replace_host(pattern: &str, host: &str) -> String {
    pattern.replace(PLACEHOLDER_HOST, host)
}

/// Drops the locale placeholders, leaving the URL a partial match points at.
pub fn cleanup(pattern: &str) -> String {
    let mut cleaned = pattern.to_string();
    for placeholder in LOCALE_PLACEHOLDERS {
        cleaned = cleaned.replace(placeholder, "");
    }
    tidy(&cleaned)
}

fn tidy(url: &str) -> String {
    let mut result = String::with_capacity(url.len());
    let mut previous_slash = false;
    for ch in url.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        result.push(ch);
    }
    result
        .trim_start_matches('.')
        .trim_end_matches(['/', '.', '-'])
        .to_ascii_lowercase()
}

/// Compiled matcher for one expanded portal URL. `{host}` matches any host,
/// `*` matches a single host label.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    regex: Regex,
}

impl UrlMatcher {
    pub fn new(url: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(url)
            .replace(r"\{host\}", "[^/]+")
            .replace(r"\*", "[^./]+");
        let regex = Regex::new(&format!("(?i)^{}(?:/|$)", escaped))?;
        Ok(Self { regex })
    }

    /// Length of the matched prefix of `request_url`, excluding the separating slash.
    pub fn match_len(&self, request_url: &str) -> Option<usize> {
        let found = self.regex.find(request_url)?;
        let matched = found.as_str();
        Some(if matched.ends_with('/') {
            found.end() - 1
        } else {
            found.end()
        })
    }
}
