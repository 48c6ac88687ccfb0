// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

use std::{env, net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use shoppulse_server::api;
use shoppulse_server::auth::permissions::audit_route_coverage;
use shoppulse_server::auth::{Role, SecurityConfig, TokenService};
use shoppulse_server::config::{HOST_ENV, LOG_FORMAT_ENV, PORT_ENV, SEED_ADMIN_EMAIL_ENV};
use shoppulse_server::otp::LogMailer;
use shoppulse_server::state::AppState;
use shoppulse_server::store::InMemoryStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Signing material, with the fallback chain logged by from_env.
    let security = SecurityConfig::from_env();
    let tokens = TokenService::new(security);

    let mut store = InMemoryStore::new();
    if let Ok(email) = env::var(SEED_ADMIN_EMAIL_ENV) {
        let admin = store.create_user(&email, Role::Admin);
        tracing::info!(email = %admin.email, "seeded admin user");
    }

    let state = AppState::new(store, tokens, Arc::new(LogMailer));

    // Surface any route the permission table does not cover; such routes
    // pass the gate without a role check.
    audit_route_coverage(&state.permissions, &api::registered_routes());

    let app = api::router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("ShopPulse server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}
