use axum::{
    extract::{OriginalUri, Query, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Json, Router,
};
use geocoding::Geocode;
use parking::database::Database;
use serde::Deserialize;

use crate::{
    common::{route_not_found, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/", get(geocode::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeQuery {
    query: Option<String>,
}

async fn geocode<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState {
        geocoding_client, ..
    }): State<WebState<D>>,
    Query(params): Query<GeocodeQuery>,
) -> RouteResult<Json<Geocode>> {
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::GET).with_uri(original_uri.path())
    };

    let query = params
        .query
        .filter(|query| !query.trim().is_empty())
        .ok_or_else(|| {
            error_context(
                RouteErrorResponse::new(StatusCode::BAD_REQUEST)
                    .with_message("Query parameter is required."),
            )
        })?;

    let Some(geocoding_client) = geocoding_client else {
        log::error!("geocoding requested but GOOGLE_MAPS_API_KEY is not set");
        return Err(error_context(
            RouteErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .with_message("Geocoding is not configured."),
        ));
    };

    geocoding_client
        .geocode(query.trim())
        .await
        .map(Json)
        .map_err(|why| error_context(why.into()))
}
