// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Server responding to device bootstrap requests.
//!
//! Devices post their chassis descriptor and an optional nonce, the server
//! answers with the signed artifact bundle from the inventory. The entity
//! manager is file based; swap in your own implementation of
//! `bootpot::service::EntityManager` to back it with a real store.

#![deny(missing_docs)]
#![deny(clippy::all)]
mod bootstrap;
mod status;

use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use bootpot::config::load_config;
use bootpot::inventory::InMemoryEntityManager;
use bootpot::log::{setup_logging, LogLevelParser};
use bootpot::pki::SecurityArtifacts;
use bootpot::proto::{GetBootstrapDataRequest, ReportStatusRequest};
use bootpot::server::new_json_cfg;
use bootpot::service::BootstrapService;
use bootstrap::post_bootstrap;
use clap::Parser;
use status::post_status;
use std::net::Ipv6Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_actix_web::TracingLogger;

/// Server state
pub struct ServerState {
    /// The protocol core
    pub service: BootstrapService,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// path to the server config file
    #[arg(long, env = "BOOTPOT_CONFIG_FILE")]
    config_file: Option<PathBuf>,
    /// port to listen on, overrides the config file
    #[arg(long, env = "PORT")]
    port: Option<u16>,
    /// Log level for the log output.
    /// Valid values are: `off`, `error`, `warn`, `info`, `debug`, `trace`
    #[clap(long, default_value_t = LevelFilter::WARN, value_parser = LogLevelParser)]
    log_level: LevelFilter,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    tracing::subscriber::set_global_default(setup_logging(
        env!("CARGO_CRATE_NAME"),
        &args.log_level,
    )?)?;

    let config = load_config(args.config_file.as_deref()).context("loading configuration")?;
    let port = args.port.unwrap_or(config.port);

    let em = InMemoryEntityManager::from_yaml_file(&config.inventory)
        .with_context(|| format!("loading inventory {}", config.inventory.display()))?;
    info!(serials = em.len(), "loaded inventory");

    let artifacts = SecurityArtifacts::load(&config.ownership_cert, &config.signing_key)
        .context("loading security artifacts")?;

    let server_state = Arc::new(ServerState {
        service: BootstrapService::new(Arc::new(em), artifacts),
    });

    info!("Starting HTTP server at port {port}");

    let server = match HttpServer::new(move || {
        App::new()
            // enable logger
            .wrap(TracingLogger::default())
            .app_data(new_json_cfg())
            .app_data(Data::new(server_state.clone()))
            .service(
                web::resource(GetBootstrapDataRequest::URL).route(web::post().to(post_bootstrap)),
            )
            .service(web::resource(ReportStatusRequest::URL).route(web::post().to(post_status)))
    })
    .bind((Ipv6Addr::UNSPECIFIED, port))
    {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to bind to port {port}: {e:?}");
            return Err(e).context(format!("Failed to bind to port {port}"));
        }
    };

    if let Err(e) = server.workers(8).run().await {
        error!("failed to start HTTP server: {e:?}");
        return Err(e).context("Failed to start HTTP server");
    }

    Ok(())
}
