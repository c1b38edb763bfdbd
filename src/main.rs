// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Stadli

use std::{sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};

use stadli_session::{
    api::router,
    auth::{Role, SessionAuthenticator},
    config::{AppConfig, ConfigError, SeedAdmin},
    state::AppState,
    storage::{StoreError, UserDatabase, UserStore},
    telemetry::init_tracing,
};

/// How long in-flight requests get to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("user store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to install rustls crypto provider")]
    CryptoProvider,

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the seed admin unless an account with that email already exists.
fn seed_admin(users: &dyn UserStore, seed: &SeedAdmin) -> Result<(), StoreError> {
    if users.get_credential(&seed.email)?.is_some() {
        info!("Seed admin already present");
        return Ok(());
    }
    match users.create_user(&seed.email, &seed.password, Role::Admin) {
        Ok(user) => {
            info!(user_id = user.id, "Seed admin created");
            Ok(())
        }
        Err(StoreError::AlreadyExists(_)) => Ok(()),
        Err(err) => Err(err),
    }
}

/// Resolves once Ctrl-C is received. Never resolves if the listener fails.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format)?;

    let users = Arc::new(UserDatabase::open(&config.user_db_path())?);
    info!(path = %config.user_db_path().display(), users = users.count()?, "User database opened");

    if let Some(seed) = &config.seed_admin {
        seed_admin(users.as_ref(), seed)?;
    }

    let authenticator = SessionAuthenticator::new(config.session_secret.clone())
        .with_ttl_hours(config.session_ttl_hours);
    let state = AppState::new(authenticator, users);
    let app = router(state);

    let addr = config.bind_addr()?;
    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            info!(
                site = %config.site_name,
                base_url = %config.base_url,
                "Listening on https://{addr} (docs at /docs)"
            );
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            warn!("TLS_CERT_PATH/TLS_KEY_PATH not set, serving plain HTTP; terminate TLS upstream");
            info!(
                site = %config.site_name,
                base_url = %config.base_url,
                "Listening on http://{addr} (docs at /docs)"
            );
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Logging may not be initialized yet.
        eprintln!("stadli-session: {err}");
        std::process::exit(1);
    }
}
