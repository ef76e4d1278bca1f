use std::time::Duration;

use staffplan_shared::api::rest::RestError;
use tracing::{info, warn};

pub mod agenda;
pub mod cli;
pub mod config;
pub mod login;
pub mod watch;

pub use cli::{Cli, Command};
pub use config::{ClientConfig, load_config, resolve_config_path};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maps REST failures; 401 means the saved token is no longer accepted.
pub(crate) fn rest_error(e: RestError) -> AppError {
    match e {
        RestError::Status { status: 401, .. } => {
            AppError::Http("session expired; please log in again".into())
        }
        other => AppError::Http(other.to_string()),
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    init_tracing();

    let employee_filter = match cli.command {
        Some(Command::Login { server, email }) => {
            return login::login(server, email, cli.config).await;
        }
        Some(Command::Agenda { employee_id }) => {
            let (_, cfg) = ClientConfig::find_and_load(cli.config)?;
            return agenda::print_agenda(&cfg, employee_id).await;
        }
        Some(Command::Tasks) => {
            let (_, cfg) = ClientConfig::find_and_load(cli.config)?;
            return agenda::print_tasks(&cfg).await;
        }
        Some(Command::Watch { employee_id }) => employee_id,
        None => None,
    };

    let (cfg_path, cfg) = ClientConfig::find_and_load(cli.config)?;
    info!(path=?cfg_path, "loaded config");
    // Fail before spawning if there is no token at all.
    cfg.token()?;

    let cancel = tokio_util::sync::CancellationToken::new();
    let cancel_child = cancel.child_token();
    let mut handle =
        tokio::spawn(async move { watch::watch_loop(cancel_child, cfg, employee_filter).await });

    let mut outcome = Ok(());
    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown signal received; requesting watch loop to stop");
            cancel.cancel();
        }
        res = &mut handle => {
            info!("watch loop finished");
            outcome = match res {
                Ok(r) => r,
                Err(e) => Err(AppError::Io(std::io::Error::other(e.to_string()))),
            };
        }
    }

    if !handle.is_finished() {
        let _ = tokio::time::timeout(Duration::from_secs(3), handle).await;
    }
    outcome
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(mut sigint), Ok(mut sigterm)) => {
                tokio::select! {
                    _ = sigint.recv() => {
                        info!("shutdown: received SIGINT");
                    }
                    _ = sigterm.recv() => {
                        info!("shutdown: received SIGTERM");
                    }
                }
            }
            _ => {
                warn!("could not install unix signal handlers; falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown: received Ctrl+C");
    }
}
