// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::structure_error_response;
use crate::app_state::AppState;
use actix_web::{HttpResponse, web};
use serde_json::{Value, json};

pub async fn list_structures(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let document_type = path.into_inner();
    match app_state.structures.get_structures(&document_type) {
        Ok(structures) => {
            let models: Vec<Value> = structures.iter().map(|metadata| metadata.to_model()).collect();
            HttpResponse::Ok().json(json!({
                "total": models.len(),
                "structures": models
            }))
        }
        Err(err) => structure_error_response("list structures", &err),
    }
}

pub async fn get_structure(
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let (document_type, key) = path.into_inner();
    match app_state.structures.get_structure(&document_type, &key) {
        Ok(metadata) => HttpResponse::Ok().json(metadata.to_model()),
        Err(err) => structure_error_response("load structure", &err),
    }
}

/// Drops cached structure metadata so edited XML is picked up.
pub async fn clear_structure_cache(app_state: web::Data<AppState>) -> HttpResponse {
    match app_state.structures.clear_cache() {
        Ok(()) => {
            log::info!("🧹 Structure cache cleared");
            HttpResponse::NoContent().finish()
        }
        Err(err) => structure_error_response("clear structure cache", &err),
    }
}
