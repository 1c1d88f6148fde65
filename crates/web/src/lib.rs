pub use crate::common::RouteResult;

use std::{env, future::Future};

use axum::{extract::FromRef, Router};
use broadcast::ChannelSink;
use database::MemoryDatabase;
use dispatch::client::Client;
use tokio::net::TcpListener;

pub mod api;
pub mod broadcast;
pub mod common;

pub type DispatchClient = Client<MemoryDatabase, ChannelSink>;

#[derive(Clone, FromRef)]
pub struct WebState {
    pub dispatch_client: DispatchClient,
    pub broadcast: ChannelSink,
}

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct WebSettings {
    pub bind_address: String,
}

impl WebSettings {
    /// Reads `WEB_BIND_ADDRESS`, falling back to `DEFAULT_BIND_ADDRESS`.
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("WEB_BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned()),
        }
    }
}

pub async fn start_web_server<F>(
    state: WebState,
    settings: WebSettings,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let routes = Router::new().nest_service("/api", api::routes(state));

    let listener = TcpListener::bind(&settings.bind_address).await?;
    log::info!("listening on {}", settings.bind_address);
    axum::serve(listener, routes.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
