use staffplan_server::{server, storage};
mod cli;

use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const DEMO_ADMIN_PASSWORD: &str = "admin123";
const DEMO_EMPLOYEE_PASSWORD: &str = "employee123";

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = cli::Cli::parse();

    // Console-only logging with env-driven level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(true)
        .init();

    let config = match server::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error=%e, "Failed to load config");
            std::process::exit(2);
        }
    };

    let location = config.storage.location.clone();
    if !config.storage.is_memory()
        && let Some(parent) = std::path::Path::new(&location).parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        tracing::error!(error=%e, path=%parent.display(), "Failed to create data dir");
        std::process::exit(3);
    }
    let store = match storage::Store::connect_sqlite(&location).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, path=%location, "Failed to connect DB");
            std::process::exit(3);
        }
    };

    match args.command {
        Some(cli::Command::CreateAdmin {
            name,
            email,
            password,
        }) => {
            let hash = match bcrypt::hash(&password, config.password_cost) {
                Ok(h) => h,
                Err(e) => {
                    tracing::error!(error=%e, "Failed to hash password");
                    std::process::exit(4);
                }
            };
            match store.ensure_admin(&name, &email, &hash).await {
                Ok(true) => tracing::info!(%email, "admin created"),
                Ok(false) => tracing::info!(%email, "admin already exists"),
                Err(e) => {
                    tracing::error!(error=%e, "Failed to create admin");
                    std::process::exit(4);
                }
            }
            return;
        }
        Some(cli::Command::Seed) => {
            if let Err(e) = seed_demo(&store, config.password_cost).await {
                tracing::error!(error=%e, "Failed to seed DB");
                std::process::exit(4);
            }
            return;
        }
        None => {}
    }

    if config.storage.seed_on_empty
        && let Err(e) = seed_demo(&store, config.password_cost).await
    {
        tracing::error!(error=%e, "Failed to seed DB");
        std::process::exit(4);
    }

    let port = config.listen_port;
    let state = server::AppState::new(config, store);
    let app = server::router(state);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error=%e, %addr, "Failed to bind listener");
            std::process::exit(5);
        }
    };

    let shutdown_token = CancellationToken::new();
    let shutdown_token_for_server = shutdown_token.clone();
    let mut server_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_token_for_server.cancelled_owned())
            .await
    });

    // Wait for OS signal; then trigger graceful, and if it hangs beyond timeout, force abort.
    shutdown_signal().await;
    tracing::info!("shutdown: initiating graceful stop");
    shutdown_token.cancel();
    match tokio::time::timeout(std::time::Duration::from_secs(3), &mut server_task).await {
        Ok(join_res) => match join_res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(%err, "server error"),
            Err(e) => tracing::error!(error=%e, "server task join error"),
        },
        Err(_) => {
            tracing::warn!("shutdown: forcing server abort due to timeout");
            server_task.abort();
        }
    }
}

async fn seed_demo(store: &storage::Store, cost: u32) -> Result<(), Box<dyn std::error::Error>> {
    let admin_hash = bcrypt::hash(DEMO_ADMIN_PASSWORD, cost)?;
    let employee_hash = bcrypt::hash(DEMO_EMPLOYEE_PASSWORD, cost)?;
    if store.seed_if_empty(admin_hash, employee_hash).await? {
        tracing::info!("demo data inserted; admin@example.com / {DEMO_ADMIN_PASSWORD}");
    } else {
        tracing::info!("database not empty; seed skipped");
    }
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(i), Ok(t)) => (i, t),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error=%e, "shutdown: cannot install signal handlers; using Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown: received Ctrl+C");
    }
}
