// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use serde_json::Value;
use sulu::routing::RouteEntity;

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn full_match_resolves_page_with_structure_details() {
    let harness = common::TestHarness::new();
    harness.seed_page("page-1", "/about", "de_at");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/de-at/about/")
        .insert_header((header::HOST, "sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["uuid"], "page-1");
    assert_eq!(body["webspace"], "sulu_io");
    assert_eq!(body["locale"], "de_at");
    assert_eq!(body["resource_locator"], "/about");
    assert_eq!(body["portal_url"], "sulu.io/de-at");
    assert_eq!(body["template"], "default");
    assert_eq!(body["view"], "pages/default");
    assert_eq!(body["controller"], "DefaultController::indexAction");
}

#[actix_web::test]
async fn partial_match_redirects_to_default_localization() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/about")
        .insert_header((header::HOST, "sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "http://sulu.io/en/about");
}

#[actix_web::test]
async fn redirect_url_points_at_target_host() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/en/about")
        .insert_header((header::HOST, "www.sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "http://sulu.io/en/about");
}

#[actix_web::test]
async fn history_route_redirects_to_current_path() {
    let harness = common::TestHarness::new();
    harness.seed_page("page-1", "/old", "en");
    harness.seed_page("page-1", "/new", "en");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/en/old")
        .insert_header((header::HOST, "sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "http://sulu.io/en/new");
}

#[actix_web::test]
async fn homepage_resolves_at_portal_root() {
    let harness = common::TestHarness::new();
    harness
        .app_state
        .routes
        .save(&RouteEntity::homepage("home-1"), "/", common::WEBSPACE, "en")
        .expect("homepage route");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/en")
        .insert_header((header::HOST, "sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["uuid"], "home-1");
    assert_eq!(body["resource_locator"], "/");
}

#[actix_web::test]
async fn unknown_host_and_unknown_path_are_not_found() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/en/about")
        .insert_header((header::HOST, "example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/en/missing")
        .insert_header((header::HOST, "sulu.io"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Test App"));
}

#[actix_web::test]
async fn dev_urls_do_not_match_in_prod() {
    let harness = common::TestHarness::new();
    harness.seed_page("page-1", "/about", "en");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::get()
        .uri("/en/about")
        .insert_header((header::HOST, "sulu.lo"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
