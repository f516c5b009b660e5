use anyhow::Result;
use axum::Router;
use clap::Parser;
use solver_core::corpus::load_documents;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use solver_server::{build_app, AppState, ServeArgs};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = ServeArgs::parse();
    let config = args.config.resolve()?;
    tracing::info!(lang = %config.lang, method = ?config.method, idf_method = ?config.idf_method, "solver settings");

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::new(config, admin_token);
    if let Some(path) = &args.corpus {
        state.solver.load_corpus(load_documents(path)?);
    } else {
        tracing::warn!("no corpus given; /search and /answer stay empty until POST /corpus");
    }
    let app: Router = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
