//! HTTP server initialization and runtime setup.
//!
//! Handles tracing setup, rule loading, the access logger, and the Axum server
//! lifecycle including graceful shutdown.

use crate::config::Config;
use crate::domain::repositories::RuleRepository;
use crate::infrastructure::access_log::AccessLogger;
use crate::infrastructure::persistence::InMemoryRuleStore;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`; `log_format` selects between
/// human-readable text and JSON lines.
pub fn init_tracing(log_level: &str, log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Rule store, loaded from the rules file
/// - Access logger and its background worker
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, the rules are
/// saved and the access logger is flushed and closed.
///
/// # Errors
///
/// Returns an error if:
/// - The rules file exists but cannot be read or parsed
/// - The access log file cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    // Starting empty over an unreadable file would let the next save replace it.
    let store = Arc::new(InMemoryRuleStore::new());
    let count = store
        .load_from_file(&config.rules_file)
        .await
        .with_context(|| format!("Failed to load rules {}", config.rules_file.display()))?;
    tracing::info!(count, path = %config.rules_file.display(), "Rules loaded");

    let access_logger =
        AccessLogger::open(&config.access_log_file, config.access_log_settings())
            .await
            .with_context(|| {
                format!(
                    "Failed to open access log {}",
                    config.access_log_file.display()
                )
            })?;
    tracing::info!("Access logger started");

    let state = AppState::new(
        store,
        config.rules_file.clone(),
        access_logger.clone(),
        config.admin_token.clone(),
    );
    let rule_service = state.rule_service.clone();

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    tracing::info!("Shutting down");

    match rule_service.save().await {
        Ok(count) => tracing::info!(count, "Rules saved"),
        Err(e) => tracing::error!(error = %e, "Failed to save rules on shutdown"),
    }

    if let Err(e) = access_logger.close().await {
        tracing::error!(error = %e, "Failed to close access logger");
    }

    served?;
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            listen_addr: "127.0.0.1:0".to_string(),
            rules_file: dir.join("rules.json"),
            access_log_file: dir.join("access.log"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_malformed_rules_file_aborts_startup_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let original = br#"[{"domain": "a.com", "target": "https://b.com",}]"#;
        std::fs::write(&config.rules_file, original).unwrap();

        let result = run(config.clone()).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(&config.rules_file).unwrap(), original);
        assert!(!config.access_log_file.exists());
    }
}
