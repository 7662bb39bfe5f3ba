// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ActivitiesQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn list_activities(
    query: web::Query<ActivitiesQuery>,
    app_state: web::Data<AppState>,
) -> HttpResponse {
    let activities = app_state
        .activities
        .recent(query.limit.unwrap_or(DEFAULT_LIMIT));
    HttpResponse::Ok().json(json!({
        "total": activities.len(),
        "activities": activities
    }))
}
