// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use sulu::app_state::{AppState, BootError};
use sulu::bootstrap::{self, BootstrapResult};
use sulu::config::ValidatedConfig;
use sulu::runtime_paths::RuntimePaths;
use sulu::{api, public, util};

const HELP_TEXT: &str = "Usage: sulu [-C <root>]\n\n  -C <root>   runtime directory (default: current directory)\n  -h, --help  show this help\n";

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("❌ Invalid command line arguments: {}", error);
            eprintln!("❌ Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if parsed_args.help {
        print!("{}", HELP_TEXT);
        return 0;
    }

    let bootstrap = match bootstrap::bootstrap_runtime(&parsed_args.runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("❌ Bootstrap error: {}", error);
            eprintln!("❌ Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: BootstrapResult) -> Result<(), BootError> {
    let BootstrapResult {
        validated_config,
        runtime_paths,
        ..
    } = bootstrap;

    if let Err(error) = util::init_logging(validated_config.log_level()) {
        eprintln!("❌ Failed to initialize logger: {}", error);
        return Err(Box::new(error));
    }

    log_startup_info(&validated_config, &runtime_paths);

    let validated_config = Arc::new(validated_config);
    let app_state = match AppState::load(validated_config.clone(), runtime_paths) {
        Ok(state) => Arc::new(state),
        Err(error) => {
            eprintln!("❌ Failed to load webspaces and routes: {}", error);
            eprintln!("❌ Application cannot start without a valid webspace configuration.");
            return Err(error);
        }
    };
    info!(
        "🌐 Serving {} webspace(s) in {} environment",
        app_state.webspaces().webspaces().len(),
        validated_config.environment.as_str()
    );

    let workers = validated_config.server.workers;
    let api_path = validated_config.admin_api_path();
    let factory = {
        let config_for_app = validated_config.clone();
        let app_state_for_app = app_state.clone();

        move || {
            let api_path = api_path.clone();
            App::new()
                .app_data(web::Data::from(config_for_app.clone()))
                .app_data(web::Data::from(app_state_for_app.clone()))
                .wrap(Logger::new(
                    r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
                ))
                .configure(move |cfg| api::configure(cfg, &api_path))
                .configure(public::configure)
        }
    };

    info!(
        "🚀 Listening on {}:{}",
        validated_config.server.host, validated_config.server.port
    );
    HttpServer::new(factory)
        .workers(workers)
        .bind((validated_config.server.host.as_str(), validated_config.server.port))?
        .run()
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

fn log_startup_info(config: &ValidatedConfig, runtime_paths: &RuntimePaths) {
    info!("Starting {}", config.app.name);
    info!("Workers: {}", config.server.workers);
    info!("Environment: {}", config.environment.as_str());
    info!(
        "Admin API available at: http://{}:{}{}",
        config.server.host,
        config.server.port,
        config.admin_api_path()
    );
    info!(
        "Webspaces directory (canonical): {}",
        runtime_paths.webspaces_dir.display()
    );
    for (document_type, paths) in &runtime_paths.structure_paths {
        for path in paths {
            info!("Structure path [{}]: {}", document_type, path.display());
        }
    }
    info!(
        "Cache directory (canonical): {}",
        runtime_paths.cache_dir.display()
    );
    info!(
        "State directory (canonical): {}",
        runtime_paths.state_dir.display()
    );
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Runtime root: {}", runtime_paths.root.display());

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {}", current_dir.display());
    }
}

struct ParsedArgs {
    runtime_root: PathBuf,
    help: bool,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut help = false;

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-h" || arg == "--help" || arg.eq_ignore_ascii_case("help") {
            help = true;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unexpected argument '{}'", arg));
        }
    }

    Ok(ParsedArgs {
        runtime_root: make_runtime_root_absolute(runtime_root)?,
        help,
    })
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}
