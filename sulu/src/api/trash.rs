// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::{json_error_response, trash_error_response};
use crate::app_state::AppState;
use crate::trash::TrashOutcome;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde_json::json;
use uuid::Uuid;

fn parse_item_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw)
        .map_err(|_| json_error_response("Invalid trash item id", StatusCode::BAD_REQUEST))
}

pub async fn list_trash(app_state: web::Data<AppState>) -> HttpResponse {
    let items = app_state.trash.list();
    HttpResponse::Ok().json(json!({
        "total": items.len(),
        "items": items
    }))
}

pub async fn restore_item(path: web::Path<String>, app_state: web::Data<AppState>) -> HttpResponse {
    let id = match parse_item_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.trash.restore(id) {
        Ok(TrashOutcome::Done(restored)) => HttpResponse::Ok().json(restored),
        Ok(TrashOutcome::Canceled) => HttpResponse::Ok().json(json!({ "outcome": "canceled" })),
        Err(err) => trash_error_response("restore trash item", &err),
    }
}

pub async fn purge_item(path: web::Path<String>, app_state: web::Data<AppState>) -> HttpResponse {
    let id = match parse_item_id(&path.into_inner()) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match app_state.trash.purge(id) {
        Ok(item) => {
            log::info!("Purged trash item {} ({} {})", item.id, item.resource_key, item.resource_id);
            HttpResponse::NoContent().finish()
        }
        Err(err) => trash_error_response("purge trash item", &err),
    }
}
