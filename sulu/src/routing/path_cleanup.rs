// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::PathCleanupConfig;
use std::collections::BTreeMap;

const DEFAULT_REPLACERS: &str = "default";

/// Turns titles into resource locator segments, e.g. `Über uns & mehr` into `ueber-uns-und-mehr` for `de`.
#[derive(Debug, Clone)]
pub struct PathCleanup {
    replacers: BTreeMap<String, Vec<(String, String)>>,
}

impl PathCleanup {
    pub fn new(replacers: &BTreeMap<String, BTreeMap<String, String>>) -> Self {
        let replacers = replacers
            .iter()
            .map(|(locale, table)| {
                let mut pairs: Vec<(String, String)> = table
                    .iter()
                    .map(|(from, to)| (from.clone(), to.clone()))
                    .collect();
                // Longer search strings first so multi-character keys win.
                pairs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
                (locale.to_ascii_lowercase(), pairs)
            })
            .collect();
        Self { replacers }
    }

    pub fn from_config(config: &PathCleanupConfig) -> Self {
        Self::new(&config.replacers)
    }

    /// Cleans a whole path; slashes separate segments and are kept.
    pub fn cleanup(&self, raw: &str, locale: &str) -> String {
        let language = locale
            .split(['_', '-'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        let mut value = raw.trim().to_string();
        for key in [language.as_str(), DEFAULT_REPLACERS] {
            if let Some(pairs) = self.replacers.get(key) {
                for (from, to) in pairs {
                    value = value.replace(from.as_str(), to);
                }
            }
        }

        let mut folded = String::with_capacity(value.len());
        for ch in value.chars().flat_map(char::to_lowercase) {
            match fold_char(ch) {
                Some(replacement) => folded.push_str(replacement),
                None if is_allowed(ch) || ch == '/' => folded.push(ch),
                None => folded.push('-'),
            }
        }

        let segments: Vec<String> = folded
            .split('/')
            .map(collapse_dashes)
            .filter(|segment| !segment.is_empty())
            .collect();
        if raw.trim_start().starts_with('/') || segments.is_empty() {
            format!("/{}", segments.join("/"))
        } else {
            segments.join("/")
        }
    }

    /// A valid resource locator is `/` or slash-separated non-empty segments
    /// of `[a-z0-9-_.]`, without a trailing slash.
    pub fn validate(path: &str) -> bool {
        if path == "/" {
            return true;
        }
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        rest.split('/')
            .all(|segment| !segment.is_empty() && segment.chars().all(is_allowed))
    }
}

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '_' | '.')
}

fn collapse_dashes(segment: &str) -> String {
    let mut result = String::with_capacity(segment.len());
    for ch in segment.chars() {
        if ch == '-' && result.ends_with('-') {
            continue;
        }
        result.push(ch);
    }
    result.trim_matches('-').to_string()
}

fn fold_char(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ą' | 'ă' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ő' | 'ō' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' => "s",
        'ß' => "ss",
        'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ů' | 'ű' | 'ū' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'þ' => "th",
        'ð' => "d",
        _ => return None,
    };
    Some(folded)
}
