// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::model::{Localization, Webspace, normalize_locale};

/// Picks replacement locales when content is missing in the requested one.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocaleChooser;

impl LocaleChooser {
    pub fn new() -> Self {
        Self
    }

    /// Fallback order for `requested` among `available`, never including `requested`.
    ///
    /// Without a webspace the available locales are kept in their given order.
    /// With one, the order is: children of the requested localization (depth
    /// first), its ancestors (nearest first), then every webspace localization.
    /// Available locales the webspace does not know come last.
    pub fn choose(
        &self,
        requested: &str,
        available: &[String],
        webspace: Option<&Webspace>,
    ) -> Vec<String> {
        let requested = normalize_locale(requested);
        let available: Vec<String> = available.iter().map(|l| normalize_locale(l)).collect();

        let mut candidates: Vec<String> = Vec::new();
        if let Some(webspace) = webspace {
            if let Some(localization) = webspace.localization(&requested) {
                for child in localization.children.iter().flat_map(Localization::flatten) {
                    candidates.push(child.locale());
                }
            }
            for parent in webspace.localization_parents(&requested) {
                candidates.push(parent.locale());
            }
            for localization in webspace.all_localizations() {
                candidates.push(localization.locale());
            }
        }
        candidates.extend(available.iter().cloned());

        let mut result: Vec<String> = Vec::new();
        for candidate in candidates {
            if candidate != requested
                && available.contains(&candidate)
                && !result.contains(&candidate)
            {
                result.push(candidate);
            }
        }
        result
    }

    /// `requested` when available, otherwise the first fallback.
    pub fn find_available_locale(
        &self,
        requested: &str,
        available: &[String],
        webspace: Option<&Webspace>,
    ) -> Option<String> {
        let normalized = normalize_locale(requested);
        if available.iter().any(|l| normalize_locale(l) == normalized) {
            return Some(normalized);
        }
        self.choose(&normalized, available, webspace)
            .into_iter()
            .next()
    }
}
