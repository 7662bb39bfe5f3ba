// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error;
use crate::app_state::AppState;
use crate::routing::route::HOMEPAGE_ENTITY_CLASS;
use crate::routing::{ResolvedRoute, RouteError};
use crate::structure::metadata::CacheLifetime;
use crate::webspace::RequestAnalysis;
use crate::webspace::model::MatchType;
use actix_web::{HttpRequest, HttpResponse, web};
use log::debug;
use serde::Serialize;

const PAGE_DOCUMENT_TYPE: &str = "page";
const HOME_DOCUMENT_TYPE: &str = "home";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPage {
    pub uuid: String,
    pub entity_class: String,
    pub route_id: String,
    pub webspace: String,
    pub portal: String,
    pub locale: String,
    pub resource_locator: String,
    pub portal_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_lifetime: Option<CacheLifetime>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    NotFound,
    /// Absolute target URL.
    Redirect(String),
    Page(Box<ResolvedPage>),
    Failed(String),
}

pub async fn resolve(req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let connection = req.connection_info();
    let resolution = resolve_request(
        &app_state,
        connection.host(),
        req.uri().path(),
        connection.scheme(),
    );
    match resolution {
        Resolution::NotFound => error::serve_404(&app_state.config.app.name),
        Resolution::Redirect(location) => error::moved_permanently(&location),
        Resolution::Page(page) => HttpResponse::Ok().json(page),
        Resolution::Failed(message) => {
            log::error!("Failed to resolve {}{}: {}", connection.host(), req.uri().path(), message);
            error::serve_500(&app_state.config.app.name)
        }
    }
}

/// Analyzes the URL, resolves its resource locator and attaches template metadata.
pub fn resolve_request(app_state: &AppState, host: &str, path: &str, scheme: &str) -> Resolution {
    let analysis = app_state
        .analyzer
        .analyze(host, path, app_state.config.environment);
    debug!(
        "Request {}{} analyzed as {:?}",
        host, path, analysis.match_type
    );

    match analysis.match_type {
        MatchType::None => Resolution::NotFound,
        MatchType::Partial | MatchType::Redirect => match &analysis.redirect {
            Some(target) => Resolution::Redirect(absolute(scheme, target)),
            None => Resolution::NotFound,
        },
        MatchType::Full => resolve_full(app_state, &analysis, scheme),
    }
}

fn resolve_full(app_state: &AppState, analysis: &RequestAnalysis, scheme: &str) -> Resolution {
    let (Some(webspace), Some(portal), Some(locale), Some(portal_url)) = (
        analysis.webspace_key.as_deref(),
        analysis.portal_key.as_deref(),
        analysis.locale(),
        analysis.portal_url.as_deref(),
    ) else {
        return Resolution::NotFound;
    };

    let resolved = match app_state
        .routes
        .load_by_resource_locator(&analysis.resource_locator, webspace, &locale)
    {
        Ok(resolved) => resolved,
        Err(RouteError::NotFound(_)) => return Resolution::NotFound,
        Err(err) => return Resolution::Failed(err.to_string()),
    };

    if let Some(current) = &resolved.moved_to {
        return Resolution::Redirect(absolute(scheme, &join_portal_url(portal_url, current)));
    }

    let mut page = ResolvedPage {
        uuid: resolved.entity_id.clone(),
        entity_class: resolved.entity_class.clone(),
        route_id: resolved.route_id.to_string(),
        webspace: webspace.to_string(),
        portal: portal.to_string(),
        locale,
        resource_locator: resolved.path.clone(),
        portal_url: portal_url.to_string(),
        template: resolved.template.clone(),
        view: None,
        controller: None,
        cache_lifetime: None,
    };
    attach_structure(app_state, &resolved, &mut page);
    Resolution::Page(Box::new(page))
}

/// Structure lookups are best effort; the page resolves without them.
fn attach_structure(app_state: &AppState, resolved: &ResolvedRoute, page: &mut ResolvedPage) {
    let Some(template) = resolved.template.as_deref() else {
        return;
    };
    let structures = &app_state.structures;
    let document_type = if resolved.entity_class == HOMEPAGE_ENTITY_CLASS
        && structures.has_structures_for(HOME_DOCUMENT_TYPE)
    {
        HOME_DOCUMENT_TYPE
    } else {
        PAGE_DOCUMENT_TYPE
    };
    if !structures.has_structures_for(document_type) {
        return;
    }
    match structures.get_structure(document_type, template) {
        Ok(metadata) => {
            page.view = metadata.view.clone();
            page.controller = metadata.controller.clone();
            page.cache_lifetime = metadata.cache_lifetime.clone();
        }
        Err(err) => log::warn!(
            "No {} structure for route {}: {}",
            document_type,
            resolved.path,
            err
        ),
    }
}

fn absolute(scheme: &str, target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("{}://{}", scheme, target)
    }
}

fn join_portal_url(portal_url: &str, resource_locator: &str) -> String {
    let base = portal_url.trim_end_matches('/');
    if resource_locator == "/" {
        if base.contains('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    } else {
        format!("{}{}", base, resource_locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_targets_get_request_scheme() {
        assert_eq!(absolute("https", "sulu.io/en"), "https://sulu.io/en");
        assert_eq!(absolute("http", "https://sulu.io"), "https://sulu.io");
    }

    #[test]
    fn history_targets_join_portal_prefix() {
        assert_eq!(join_portal_url("sulu.io/en", "/b"), "sulu.io/en/b");
        assert_eq!(join_portal_url("sulu.io/en", "/"), "sulu.io/en");
        assert_eq!(join_portal_url("sulu-at.lo", "/"), "sulu-at.lo/");
    }
}
