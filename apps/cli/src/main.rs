mod args;
mod config;
mod dirs;
mod scheduler;

use std::io;
use std::net::SocketAddr;

use app_api::{AppContext, expand_home_path};
use http_api::HttpState;
use tokio::sync::watch;
use youknow_app::{AppConfig, AppPaths, AppState, MAX_WINDOW_DAYS, RunResult, ensure_app_data_dir};

const DEFAULT_LOG_FILTER: &str = "youknow=info,youknow_app=info,ingest=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let config = config::load_or_create().map_err(io::Error::other)?;
    if config.created {
        tracing::info!(path = %config.paths.file.display(), "created default config");
    }

    let data_dir = dirs::data_dir().map_err(io::Error::other)?;
    let paths = AppPaths::new(data_dir);
    ensure_app_data_dir(&paths).map_err(|err| io::Error::other(err.to_string()))?;
    tracing::info!(data_dir = %paths.app_data_dir.display(), "using data dir");

    let home = dirs::home_dir();
    let app_config = AppConfig {
        db_path: paths.db_path.clone(),
        history_path: config
            .config
            .history_path
            .as_deref()
            .map(|path| expand_home_path(path, home.as_deref())),
        pipeline: config.config.pipeline(),
    };
    let interval = app_config.pipeline.interval();
    if app_config.pipeline.windows_days.iter().any(|days| *days > MAX_WINDOW_DAYS) {
        tracing::warn!(max = MAX_WINDOW_DAYS, "windows_days longer than the maximum are clamped");
    }

    let app_state = AppState::new(app_config);
    let selection = app_state.coordinator.storage();
    if selection.fallback {
        tracing::warn!(
            reason = selection.fallback_reason.as_deref().unwrap_or("unknown"),
            "storage unavailable, results will not survive a restart"
        );
    }

    if args.once {
        return run_once(app_state).await;
    }

    let restore_state = app_state.clone();
    tokio::task::spawn_blocking(move || restore_state.initialize()).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if args.no_schedule {
        None
    } else {
        Some(scheduler::spawn(app_state.clone(), interval, shutdown_rx))
    };

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let router = http_api::router(HttpState::new(context));

    let port = args.port.unwrap_or(config.config.port);
    let (listener, actual_port, used_fallback) = bind_port(port).await?;
    if used_fallback {
        tracing::warn!(port, actual_port, "configured port unavailable, using another for this run");
    }
    println!("youknow is serving http://127.0.0.1:{actual_port}/api");
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(scheduler) = scheduler {
        if let Err(err) = scheduler.await {
            tracing::error!(%err, "scheduler task failed");
        }
    }
    Ok(())
}

async fn run_once(app_state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let result =
        tokio::task::spawn_blocking(move || app_state.services.pipeline.run_scheduled()).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    match result {
        RunResult::Ran(report) => match report.error {
            Some(error) if !report.published => Err(io::Error::other(error.message).into()),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

async fn bind_port(port: u16) -> Result<(tokio::net::TcpListener, u16, bool), io::Error> {
    if port == 0 {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let actual_port = listener.local_addr()?.port();
        return Ok((listener, actual_port, false));
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => Ok((listener, port, false)),
        Err(_) => {
            let listener =
                tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
            let actual_port = listener.local_addr()?.port();
            Ok((listener, actual_port, true))
        }
    }
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
}
