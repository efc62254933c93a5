use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, OriginalUri, Query, State},
    http::Method,
    routing::{get, on},
    Extension, Router,
};
use model::carpark::{Carpark, SearchResult};
use parking::{database::Database, search::DEFAULT_RADIUS_METERS};
use serde::Deserialize;
use utility::{geo::Coordinate, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, VecResponse,
        METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/carparks{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Carpark>))
        .route("/search", get(search::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchQuery {
    lat: f64,
    lng: f64,
    radius_meters: Option<f64>,
}

async fn search<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> HateoasResult<VecResponse<hateoas::Response<SearchResult>>> {
    let Query(params) = query.map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_message("Valid lat and lng parameters are required.")
            .with_uri(original_uri.path())
    })?;
    let center = Coordinate::new(params.lat, params.lng);
    let radius_meters = params.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS);

    parking_client
        .search_nearby(center, radius_meters)
        .await
        .map(|results| {
            results
                .into_iter()
                .map(|result| search_result_hateoas(result, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

pub(crate) fn search_result_hateoas(
    result: SearchResult,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<SearchResult> {
    let location = result.content.content.location;
    hateoas::Response::builder(result, base_url)
        .location_links(&location)
        .build()
}
