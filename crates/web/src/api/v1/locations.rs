use axum::{
    extract::{OriginalUri, Query},
    http::{Method, StatusCode},
    routing::{get, on},
    Json, Router,
};
use model::maps_url::{google_maps_url, parse_location};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo::Coordinate;

use crate::common::{
    route_not_found, schema_no_example, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL,
};

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/parse", get(parse))
        .route("/schema", get(schema_no_example::<ParsedLocation>))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseQuery {
    text: Option<String>,
}

/// A position recognised in a pasted map link or coordinate pair.
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParsedLocation {
    #[serde(flatten)]
    location: Coordinate,
    maps_url: String,
}

async fn parse(
    OriginalUri(original_uri): OriginalUri,
    Query(params): Query<ParseQuery>,
) -> RouteResult<Json<ParsedLocation>> {
    let text = params.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(RouteErrorResponse::new(StatusCode::BAD_REQUEST)
            .with_method(&Method::GET)
            .with_message("Text parameter is required.")
            .with_uri(original_uri.path()));
    }

    parse_location(&text)
        .map(|location| {
            Json(ParsedLocation {
                location,
                maps_url: google_maps_url(&location),
            })
        })
        .ok_or_else(|| {
            RouteErrorResponse::new(StatusCode::NOT_FOUND)
                .with_method(&Method::GET)
                .with_message("No coordinates in Singapore found in the given text.")
                .with_uri(original_uri.path())
        })
}
