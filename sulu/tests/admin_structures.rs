// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::api;
use serde_json::Value;

#[actix_web::test]
async fn webspaces_are_listed() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get().uri(&api("/webspaces")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["webspaces"][0]["key"], "sulu_io");
}

#[actix_web::test]
async fn structures_are_listed_and_loaded_by_key() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get().uri(&api("/structures/page")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["structures"][0]["key"], "default");

    let req = test::TestRequest::get()
        .uri(&api("/structures/page/default"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["view"], "pages/default");
    assert_eq!(body["title"]["de"], "Standard");
    assert_eq!(body["form"]["title"]["required"], true);
    assert_eq!(body["form"]["url"]["type"], "resource_locator");
}

#[actix_web::test]
async fn unknown_structures_are_not_found() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri(&api("/structures/page/missing"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&api("/structures/snippet"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cache_clear_picks_up_new_templates() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get().uri(&api("/structures/page")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);

    let overview = common::DEFAULT_TEMPLATE_XML
        .replace("<key>default</key>", "<key>overview</key>")
        .replace("pages/default", "pages/overview");
    harness
        .fixture
        .write_file("templates/pages/overview.xml", &overview)
        .expect("overview template");

    let req = test::TestRequest::delete()
        .uri(&api("/structures/cache"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&api("/structures/page")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
}
