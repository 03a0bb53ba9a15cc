use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use ntc_core::class_client::ClientConfig;
use reqwest::Url;
use tracing::info;

mod route;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Arguments {
    /// the class table endpoint of the student portal
    #[arg(long, env = "NTC_CLASS_TABLE_URL")]
    pub url: Url,
    /// seconds to wait for the class table of each weekday
    #[arg(long, env = "NTC_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,
    /// the address to listen on
    #[arg(long, env = "NTC_BIND", default_value = "0.0.0.0:8008")]
    pub bind: SocketAddr,
}

pub fn app(config: ClientConfig) -> Router {
    Router::new()
        .route("/calendar", get(route::calendar::handler))
        .route("/timetable", get(route::timetable::handler))
        .route("/events", get(route::events::handler))
        .with_state(Arc::new(config))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Arguments::parse();
    let config = ClientConfig {
        url: args.url,
        timeout: Duration::from_secs(args.timeout),
    };
    info!("listening on {}", args.bind);
    axum::Server::bind(&args.bind)
        .serve(app(config).into_make_service())
        .await?;
    Ok(())
}
