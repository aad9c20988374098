//! Liveness endpoint
//!
//! A single-route HTTP server used by the hosting platform's health
//! probe. Runs on its own task and shares no state with the bot.

use axum::routing::get;
use axum::Router;
use tracing::info;

use crate::utils::errors::Result;

pub async fn serve(port: u16) -> Result<()> {
    let app = Router::new().route("/", get(|| async { "OK" }));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "Health check server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
