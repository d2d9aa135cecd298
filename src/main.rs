use bookshelf::config::{Backend, Cli, Config, default_config_dir, default_config_path};
use bookshelf::handler::{AppState, app};
use bookshelf::store::{LibsqlStore, MemoryStore};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // With --config the data directory is the config file's parent,
    // otherwise ~/.bookshelf/ holds both.
    let (config_path, data_dir) = match args.config_path {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            let dir = path
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            (path, dir)
        }
        None => (default_config_path(), default_config_dir()),
    };

    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("failed to create data directory {:?}: {}", data_dir, e);
        std::process::exit(1);
    }

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("bookshelf.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let state = match cfg.app.backend {
        Backend::Memory => {
            tracing::warn!("using in-memory store, books will not survive a restart");
            AppState::new(MemoryStore::new())
        }
        Backend::Libsql => {
            let store = LibsqlStore::new(&cfg.app, &data_dir).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to setup database");
                std::process::exit(1);
            });
            if let Err(e) = store.sync().await {
                tracing::warn!(error = %e, "initial replica sync failed");
            }
            AppState::new(store)
        }
    };

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    tracing::info!("bookshelf.svc running on {}", &address);
    let result = axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl+c");
            }
            tracing::info!("ctrl+c signal received, preparing to shutdown");
        })
        .await;

    if let Err(err) = result {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("bookshelf.svc going off, graceful shutdown complete");
}
