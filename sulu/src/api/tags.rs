// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::error::{tag_error_response, trash_error_response};
use crate::app_state::AppState;
use crate::tags::TAGS_RESOURCE_KEY;
use crate::trash::TrashOutcome;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

pub async fn list_tags(app_state: web::Data<AppState>) -> HttpResponse {
    let tags = app_state.tags.list();
    HttpResponse::Ok().json(json!({
        "total": tags.len(),
        "tags": tags
    }))
}

pub async fn create_tag(body: web::Json<TagRequest>, app_state: web::Data<AppState>) -> HttpResponse {
    match app_state.tags.create(&body.name) {
        Ok(tag) => HttpResponse::Created().json(tag),
        Err(err) => tag_error_response("create tag", &err),
    }
}

pub async fn rename_tag(
    path: web::Path<u64>,
    body: web::Json<TagRequest>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    match app_state.tags.rename(path.into_inner(), &body.name) {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => tag_error_response("rename tag", &err),
    }
}

/// Deleting a tag moves it to the trash.
pub async fn delete_tag(path: web::Path<u64>, app_state: web::Data<AppState>) -> HttpResponse {
    let id = path.into_inner();
    match app_state
        .trash
        .move_to_trash(TAGS_RESOURCE_KEY, &id.to_string())
    {
        Ok(TrashOutcome::Done(item)) => HttpResponse::Ok().json(json!({
            "trashItemId": item.id,
            "title": item.title
        })),
        Ok(TrashOutcome::Canceled) => HttpResponse::Ok().json(json!({ "outcome": "canceled" })),
        Err(err) => trash_error_response("trash tag", &err),
    }
}
