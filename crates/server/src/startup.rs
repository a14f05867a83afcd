use std::{future::Future, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use service::catalog::{CatalogService, CatalogSettings, HttpCatalogUpstream};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog: Arc::new(catalog) }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the HTTP upstream, catalog service and router from configuration.
pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let upstream = HttpCatalogUpstream::from_config(&cfg.upstream)?;
    let catalog = CatalogService::with_settings(Arc::new(upstream), CatalogSettings::from_config(cfg));
    Ok(routes::build_router(AppState::new(catalog), build_cors(), &cfg.server.prefix))
}

/// Bind and serve until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg)?;

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(
        %addr,
        prefix = %cfg.server.prefix,
        upstream = %cfg.upstream.base_url,
        "catalog server listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("catalog server stopped");
    Ok(())
}
