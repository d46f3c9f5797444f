//! REST API module for partlink
//!
//! Serves lookups over a shared `Catalog`. Uses axum for routing.

pub mod handlers;
pub mod routing;
pub mod types;

use anyhow::Result;
use axum::serve;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::catalog::Catalog;
use routing::create_router;

/// Start the REST server
pub async fn start_server(addr: SocketAddr, catalog: Arc<Catalog>) -> Result<()> {
  let app = create_router(catalog)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await?;
  info!("Server listening on {addr}");

  match serve(listener, app).await {
    Ok(_) => {
      info!("Server shutdown gracefully");
      Ok(())
    }
    Err(e) => {
      error!("Server error: {e}");
      Err(anyhow::anyhow!("Server error: {}", e))
    }
  }
}
