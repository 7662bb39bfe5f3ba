// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::{
    hash_error_response, json_error_response, log_and_return_generic_error, route_error_response,
};
use crate::app_state::AppState;
use crate::hash::content_hash;
use crate::routing::{BatchOutcome, Route, RouteEntity, RouteError, SaveOutcome};
use crate::webspace::LocaleChooser;
use crate::webspace::model::normalize_locale;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub webspace: String,
    pub locale: String,
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRouteRequest {
    pub webspace: String,
    pub locale: String,
    pub uuid: String,
    pub path: String,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub homepage: bool,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveTreeRequest {
    pub webspace: String,
    pub locale: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuery {
    pub webspace: String,
    pub locale: String,
    pub title: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityRoutes {
    route: Route,
    history: Vec<Route>,
    hash: String,
    /// Set when `route` comes from a fallback locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    ghost_locale: Option<String>,
}

/// Normalized locale when the webspace knows it.
fn ensure_scope(app_state: &AppState, webspace: &str, locale: &str) -> Result<String, HttpResponse> {
    let Some(found) = app_state.webspaces().find_webspace(webspace) else {
        return Err(json_error_response(
            &format!("Unknown webspace '{}'", webspace),
            StatusCode::BAD_REQUEST,
        ));
    };
    if found.localization(locale).is_none() {
        return Err(json_error_response(
            &format!("Webspace '{}' has no localization '{}'", webspace, locale),
            StatusCode::BAD_REQUEST,
        ));
    }
    Ok(normalize_locale(locale))
}

fn batch_response(outcome: BatchOutcome) -> HttpResponse {
    match outcome {
        BatchOutcome::Applied(count) => HttpResponse::Ok().json(json!({ "removed": count })),
        BatchOutcome::Canceled => HttpResponse::Ok().json(json!({ "outcome": "canceled" })),
    }
}

/// Active route with its history, or every route of the scope without `uuid`.
pub async fn get_routes(
    query: web::Query<ScopeQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let locale = match ensure_scope(&app_state, &query.webspace, &query.locale) {
        Ok(locale) => locale,
        Err(response) => return response,
    };

    let Some(uuid) = query.uuid.as_deref() else {
        return match app_state.routes.routes(&query.webspace, &locale) {
            Ok(routes) => HttpResponse::Ok().json(json!({
                "total": routes.len(),
                "routes": routes
            })),
            Err(err) => route_error_response("list routes", &err),
        };
    };

    let loaded = app_state
        .routes
        .load_by_content_uuid(uuid, &query.webspace, &locale)
        .and_then(|route| {
            let history =
                app_state
                    .routes
                    .load_history_by_content_uuid(uuid, &query.webspace, &locale)?;
            Ok((route, history, None))
        })
        .or_else(|err| match err {
            RouteError::NotFound(_) => load_ghost_route(&app_state, uuid, &query.webspace, &locale)
                .map(|(route, ghost)| (route, Vec::new(), Some(ghost)))
                .ok_or(err),
            err => Err(err),
        });
    let (route, history, ghost_locale) = match loaded {
        Ok(found) => found,
        Err(err) => return route_error_response("load routes", &err),
    };
    match content_hash(&route) {
        Ok(hash) => HttpResponse::Ok().json(EntityRoutes {
            route,
            history,
            hash,
            ghost_locale,
        }),
        Err(err) => hash_error_response("hash route", &err),
    }
}

/// Active route of the entity in the best fallback locale.
fn load_ghost_route(
    app_state: &AppState,
    uuid: &str,
    webspace: &str,
    locale: &str,
) -> Option<(Route, String)> {
    let available = match app_state.routes.locales_of(uuid, webspace) {
        Ok(available) => available,
        Err(err) => {
            log::warn!("Cannot list locales of {}: {}", uuid, err);
            return None;
        }
    };
    let fallback = LocaleChooser::new()
        .choose(locale, &available, app_state.webspaces().find_webspace(webspace))
        .into_iter()
        .next()?;
    let route = app_state
        .routes
        .load_by_content_uuid(uuid, webspace, &fallback)
        .ok()?;
    Some((route, fallback))
}

/// Creates or renames the active route of an entity.
pub async fn save_route(
    body: web::Json<SaveRouteRequest>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let request = body.into_inner();
    let locale = match ensure_scope(&app_state, &request.webspace, &request.locale) {
        Ok(locale) => locale,
        Err(response) => return response,
    };

    let mut entity = if request.homepage {
        RouteEntity::homepage(&request.uuid)
    } else {
        RouteEntity::page(&request.uuid)
    };
    if let Some(template) = request.template.as_deref() {
        entity = entity.with_template(template);
    }

    let outcome = match app_state.routes.save_checked(
        &entity,
        &request.path,
        &request.webspace,
        &locale,
        request.hash.as_deref(),
        request.force,
    ) {
        Ok(outcome) => outcome,
        Err(err) => {
            if matches!(err, RouteError::InvalidHash(_)) {
                log::info!(
                    "Rejected stale route update for {} ({}, {})",
                    request.uuid,
                    request.webspace,
                    locale
                );
            }
            return route_error_response("save route", &err);
        }
    };
    if matches!(outcome, SaveOutcome::Canceled) {
        return HttpResponse::Ok().json(json!({ "outcome": "canceled" }));
    }

    let mut body = match serde_json::to_value(&outcome) {
        Ok(value) => value,
        Err(err) => {
            return log_and_return_generic_error(
                "serialize route",
                &err,
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    };
    if let (Some(route), Value::Object(map)) = (outcome.route(), &mut body) {
        match content_hash(route) {
            Ok(hash) => {
                map.insert("hash".to_string(), Value::String(hash));
            }
            Err(err) => return hash_error_response("hash route", &err),
        }
    }
    HttpResponse::Ok().json(body)
}

/// Removes one history route.
pub async fn delete_route(path: web::Path<String>, app_state: web::Data<AppState>) -> HttpResponse {
    let Ok(id) = Uuid::parse_str(&path.into_inner()) else {
        return json_error_response("Invalid route id", StatusCode::BAD_REQUEST);
    };
    match app_state.routes.delete_route(id) {
        Ok(outcome) => batch_response(outcome),
        Err(err) => route_error_response("delete route", &err),
    }
}

/// Removes the active route of an entity together with its history.
pub async fn delete_entity_routes(
    query: web::Query<ScopeQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let locale = match ensure_scope(&app_state, &query.webspace, &query.locale) {
        Ok(locale) => locale,
        Err(response) => return response,
    };
    let Some(uuid) = query.uuid.as_deref() else {
        return json_error_response("Missing uuid", StatusCode::BAD_REQUEST);
    };
    match app_state
        .routes
        .delete_by_entity(uuid, &query.webspace, &locale)
    {
        Ok(outcome) => batch_response(outcome),
        Err(err) => route_error_response("delete entity routes", &err),
    }
}

pub async fn move_tree(
    body: web::Json<MoveTreeRequest>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let locale = match ensure_scope(&app_state, &body.webspace, &body.locale) {
        Ok(locale) => locale,
        Err(response) => return response,
    };
    match app_state
        .routes
        .move_tree(&body.from, &body.to, &body.webspace, &locale)
    {
        Ok(BatchOutcome::Applied(count)) => HttpResponse::Ok().json(json!({ "moved": count })),
        Ok(BatchOutcome::Canceled) => HttpResponse::Ok().json(json!({ "outcome": "canceled" })),
        Err(err) => route_error_response("move route tree", &err),
    }
}

/// Proposes a free resource locator for a title.
pub async fn generate(
    query: web::Query<GenerateQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let locale = match ensure_scope(&app_state, &query.webspace, &query.locale) {
        Ok(locale) => locale,
        Err(response) => return response,
    };
    let candidate = app_state
        .routes
        .generate(&query.title, query.parent.as_deref(), &locale);
    match app_state
        .routes
        .unique_path(&candidate, &query.webspace, &locale)
    {
        Ok(path) => HttpResponse::Ok().json(json!({ "resourcelocator": path })),
        Err(err) => route_error_response("generate resource locator", &err),
    }
}
