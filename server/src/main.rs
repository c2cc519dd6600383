use anyhow::Result;
use axum::Router;
use clap::Parser;
use recsearch_core::IndexConfig;
use recsearch_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Minimum number of documents a term must appear in
    #[arg(long, default_value_t = 1)]
    min_df: u32,
    /// Cap on vocabulary size
    #[arg(long)]
    max_features: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let index = IndexConfig { min_df: args.min_df, max_features: args.max_features };
    index.validate()?;
    let config = ServerConfig { index, admin_token: std::env::var("ADMIN_TOKEN").ok() };
    let app: Router = build_app(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
