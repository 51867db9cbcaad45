// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use catalog_auth_server::{
    api::router,
    config::{init_tracing, Settings},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration errors abort startup before anything is served
    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    tracing::info!(
        token_ttl_secs = settings.token_ttl_secs,
        legacy_token_locations = settings.legacy_token_locations,
        secret_len = settings.secret.len(),
        "loaded configuration"
    );
    if settings.legacy_token_locations {
        tracing::warn!("form-field and query-string credentials are enabled");
    }

    let state = AppState::from_settings(&settings)?;
    if let Some(seed) = &settings.seed_admin {
        state.seed_admin(seed).await?;
    }

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    tracing::info!(addr = %listener.local_addr()?, "catalog auth server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
