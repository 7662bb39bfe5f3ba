// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::api;
use serde_json::{Value, json};

#[actix_web::test]
async fn deleted_tag_can_be_restored_from_trash() {
    let harness = common::TestHarness::new();
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::post()
        .uri(&api("/tags"))
        .set_json(json!({ "name": "News" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let tag: Value = test::read_body_json(resp).await;
    let tag_id = tag["id"].as_u64().expect("tag id");

    let req = test::TestRequest::delete()
        .uri(&api(&format!("/tags/{}", tag_id)))
        .to_request();
    let trashed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trashed["title"], "News");
    let item_id = trashed["trashItemId"].as_str().expect("trash item id").to_string();

    let req = test::TestRequest::get().uri(&api("/tags")).to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tags["total"], 0);

    let req = test::TestRequest::get().uri(&api("/trash")).to_request();
    let trash: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trash["total"], 1);
    assert_eq!(trash["items"][0]["resource_key"], "tags");

    let req = test::TestRequest::post()
        .uri(&api(&format!("/trash/{}/restore", item_id)))
        .to_request();
    let restored: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(restored["resource_id"], tag_id.to_string());
    assert_eq!(restored["title"], "News");

    let req = test::TestRequest::get().uri(&api("/tags")).to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tags["tags"][0]["id"], tag_id);
    assert_eq!(tags["tags"][0]["name"], "News");

    let req = test::TestRequest::get().uri(&api("/trash")).to_request();
    let trash: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trash["total"], 0);

    let req = test::TestRequest::get().uri(&api("/activities")).to_request();
    let activities: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = activities["activities"]
        .as_array()
        .expect("activities")
        .iter()
        .filter_map(|activity| activity["name"].as_str())
        .collect();
    assert_eq!(names, vec!["trash_item.restored", "resource.trashed"]);
}

#[actix_web::test]
async fn restore_conflicts_when_name_was_reused() {
    let harness = common::TestHarness::new();
    let tag = harness.app_state.tags.create("News").expect("tag");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::delete()
        .uri(&api(&format!("/tags/{}", tag.id)))
        .to_request();
    let trashed: Value = test::call_and_read_body_json(&app, req).await;
    let item_id = trashed["trashItemId"].as_str().expect("trash item id").to_string();

    harness.app_state.tags.create("News").expect("new tag with same name");

    let req = test::TestRequest::post()
        .uri(&api(&format!("/trash/{}/restore", item_id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(harness.app_state.trash.list().len(), 1);
}

#[actix_web::test]
async fn purge_and_unknown_items() {
    let harness = common::TestHarness::new();
    let tag = harness.app_state.tags.create("Events").expect("tag");
    let app = test::init_service(common::build_test_app(&harness)).await;

    let req = test::TestRequest::delete()
        .uri(&api(&format!("/tags/{}", tag.id)))
        .to_request();
    let trashed: Value = test::call_and_read_body_json(&app, req).await;
    let item_id = trashed["trashItemId"].as_str().expect("trash item id").to_string();

    let req = test::TestRequest::delete()
        .uri(&api(&format!("/trash/{}", item_id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri(&api(&format!("/trash/{}/restore", item_id)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&api("/trash/not-a-uuid/restore"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete().uri(&api("/tags/999")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
