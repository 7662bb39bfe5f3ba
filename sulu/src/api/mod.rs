// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Admin JSON API, mounted below `<admin path>/api`.

use crate::collaboration::collaboration_ws;
use actix_web::web;

mod activities;
pub mod error;
mod routes;
mod structures;
mod tags;
mod trash;
mod webspaces;

pub fn configure(cfg: &mut web::ServiceConfig, api_path: &str) {
    cfg.service(
        web::scope(api_path)
            .route("/webspaces", web::get().to(webspaces::list_webspaces))
            .route("/structures/cache", web::delete().to(structures::clear_structure_cache))
            .route("/structures/{document_type}", web::get().to(structures::list_structures))
            .route(
                "/structures/{document_type}/{key}",
                web::get().to(structures::get_structure),
            )
            .route("/routes", web::get().to(routes::get_routes))
            .route("/routes", web::put().to(routes::save_route))
            .route("/routes", web::delete().to(routes::delete_entity_routes))
            .route("/routes/generate", web::get().to(routes::generate))
            .route("/routes/move", web::post().to(routes::move_tree))
            .route("/routes/{id}", web::delete().to(routes::delete_route))
            .route("/trash", web::get().to(trash::list_trash))
            .route("/trash/{id}", web::delete().to(trash::purge_item))
            .route("/trash/{id}/restore", web::post().to(trash::restore_item))
            .route("/tags", web::get().to(tags::list_tags))
            .route("/tags", web::post().to(tags::create_tag))
            .route("/tags/{id}", web::put().to(tags::rename_tag))
            .route("/tags/{id}", web::delete().to(tags::delete_tag))
            .route("/activities", web::get().to(activities::list_activities))
            .route("/collaboration", web::get().to(collaboration_ws)),
    );
}
