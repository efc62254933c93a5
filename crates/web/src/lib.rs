pub use crate::common::RouteResult;

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use config::Config;
use geocoding::GeocodingClient;
use parking::{database::Database, Client};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;

#[derive(Clone)]
pub struct WebState<D>
where
    D: Database,
{
    pub parking_client: Client<D>,
    /// `None` when no Google Maps API key is configured.
    pub geocoding_client: Option<GeocodingClient>,
    /// `None` keeps every admin route closed.
    pub admin_key: Option<Arc<str>>,
    pub development: bool,
}

impl<D> WebState<D>
where
    D: Database,
{
    pub fn new(
        parking_client: Client<D>,
        geocoding_client: Option<GeocodingClient>,
        config: &Config,
    ) -> Self {
        Self {
            parking_client,
            geocoding_client,
            admin_key: config.admin_key.as_deref().map(Arc::from),
            development: config.development,
        }
    }
}

/// The complete http application. Everything lives below `/api`.
pub fn app<D: Database>(state: WebState<D>) -> Router {
    let development = state.development;
    Router::new()
        .nest_service("/api", api::routes(state))
        .layer(axum::middleware::from_fn_with_state(
            development,
            middleware::error_details::redact_error_details,
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server<D: Database>(
    state: WebState<D>,
    bind_address: SocketAddr,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        log::error!("could not listen for shutdown signal: {}", why);
        std::future::pending::<()>().await;
    }
}
