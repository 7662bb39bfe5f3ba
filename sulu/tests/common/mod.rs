// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use std::sync::Arc;
use sulu::api;
use sulu::app_state::AppState;
use sulu::config::ValidatedConfig;
use sulu::public;
use sulu::routing::RouteEntity;
use sulu::util::TestConfigBuilder;
use sulu::util::test_fixtures::TestFixtureRoot;

pub const WEBSPACE: &str = "sulu_io";
pub const ADMIN_API: &str = "/admin/api";

pub const SULU_IO_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<webspace xmlns="http://schemas.sulu.io/webspace/webspace">
    <name>Sulu CMF</name>
    <key>sulu_io</key>
    <localizations>
        <localization language="en" default="true"/>
        <localization language="de">
            <localization language="de" country="at"/>
        </localization>
    </localizations>
    <portals>
        <portal>
            <name>Sulu CMF</name>
            <key>sulu_io</key>
            <environments>
                <environment type="prod">
                    <urls>
                        <url>sulu.io/{localization}</url>
                        <url redirect="sulu.io">www.sulu.io</url>
                    </urls>
                </environment>
                <environment type="dev">
                    <urls>
                        <url>sulu.lo/{localization}</url>
                    </urls>
                </environment>
            </environments>
        </portal>
    </portals>
</webspace>"#;

pub const DEFAULT_TEMPLATE_XML: &str = r#"<?xml version="1.0" ?>
<template xmlns="http://schemas.sulu.io/template/template">
    <key>default</key>
    <view>pages/default</view>
    <controller>DefaultController::indexAction</controller>
    <cacheLifetime>604800</cacheLifetime>
    <meta>
        <title lang="en">Default</title>
        <title lang="de">Standard</title>
    </meta>
    <properties>
        <property name="title" type="text_line" mandatory="true">
            <meta><title lang="en">Title</title></meta>
            <tag name="sulu.rlp.part"/>
        </property>
        <property name="url" type="resource_locator" mandatory="true">
            <tag name="sulu.rlp"/>
        </property>
    </properties>
</template>"#;

pub struct TestHarness {
    pub fixture: TestFixtureRoot,
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
}

impl TestHarness {
    pub fn new() -> Self {
        let fixture = TestFixtureRoot::new_unique("sulu-it").expect("fixture root");
        fixture
            .write_file("webspaces/sulu_io.xml", SULU_IO_XML)
            .expect("webspace xml");
        fixture
            .write_file("templates/pages/default.xml", DEFAULT_TEMPLATE_XML)
            .expect("template xml");

        let config = TestConfigBuilder::new()
            .with_structure_paths("page", &["templates/pages"])
            .build();
        let runtime_paths = fixture.runtime_paths(&config).expect("runtime paths");
        let config = Arc::new(config);
        let app_state =
            Arc::new(AppState::load(config.clone(), runtime_paths).expect("app state"));

        Self {
            fixture,
            config,
            app_state,
        }
    }

    /// Stores an active page route directly, bypassing the API.
    pub fn seed_page(&self, uuid: &str, path: &str, locale: &str) {
        let entity = RouteEntity::page(uuid).with_template("default");
        self.app_state
            .routes
            .save(&entity, path, WEBSPACE, locale)
            .expect("seed route");
    }
}

pub fn build_test_app(
    harness: &TestHarness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let api_path = harness.config.admin_api_path();
    App::new()
        .app_data(web::Data::from(harness.config.clone()))
        .app_data(web::Data::from(harness.app_state.clone()))
        .configure(move |cfg| api::configure(cfg, &api_path))
        .configure(public::configure)
}

pub fn api(path: &str) -> String {
    format!("{}{}", ADMIN_API, path)
}
