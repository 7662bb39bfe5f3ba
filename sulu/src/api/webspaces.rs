// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::app_state::AppState;
use actix_web::{HttpResponse, web};
use serde_json::json;

pub async fn list_webspaces(app_state: web::Data<AppState>) -> HttpResponse {
    let webspaces = app_state.webspaces().webspaces();
    HttpResponse::Ok().json(json!({
        "total": webspaces.len(),
        "webspaces": webspaces
    }))
}
