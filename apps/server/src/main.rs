#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;

mod error;
mod routes;
mod state;

use error::AppError;
use latmon::config::Config;
use latmon::probe::{Prober, TcpPinger};
use latmon::storage::{LibsqlStorage, Storage};
use latmon::tasks::{TaskRegistry, TaskScheduler};
use logger::init_tracing;
use state::AppState;

#[derive(Parser)]
#[command(name = "latmon-server", about = "Latency probing and tracking service")]
struct Cli {
    /// Path to the TOML config file (defaults to the XDG config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config)?;

    let pool = latmon::pool::connect_pool(&config.database.path).await?;
    let conn = pool.get().await.context("failed to acquire database connection")?;
    latmon::storage::initialize_database(&conn).await?;
    drop(conn);

    let storage: Arc<dyn Storage> = Arc::new(LibsqlStorage::new_from_pool(pool));
    let registry = Arc::new(TaskRegistry::new());
    let pinger = Arc::new(TcpPinger::new(config.probe.tcp_port, config.probe.timeout_seconds));
    let scheduler = Arc::new(TaskScheduler::new(
        Arc::clone(&registry),
        Arc::clone(&storage),
        Prober::new(pinger),
    ));

    let addr: SocketAddr = format!("{}:{}", config.http.bind, config.http.port).parse()?;
    run_server(addr, AppState { scheduler, storage }).await
}

async fn run_server(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    tracing::info!("listening on {addr}");

    let data = web::Data::new(state);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
