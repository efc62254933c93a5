use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::Method,
    routing::{get, on, put},
    Extension, Json, Router,
};
use model::{
    carpark::{Carpark, CarparkUpdate},
    WithId,
};
use parking::database::Database;
use utility::{id::Id, let_also::LetAlso};

use super::carparks::carpark_hateoas;
use crate::{
    common::{
        route_not_found, Acknowledgement, HateoasResult, RouteErrorResponse,
        RouteResult, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/", get(pending_suggestions::<D>))
        .route(
            "/:id",
            put(approve_suggestion::<D>).delete(reject_suggestion::<D>),
        )
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Unverified carparks, newest first.
async fn pending_suggestions<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Carpark>>>> {
    parking_client
        .pending_suggestions()
        .await
        .map(|suggestions| {
            suggestions
                .into_iter()
                .map(|suggestion| carpark_hateoas(suggestion, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

/// Applies the reviewer's corrections and publishes the suggestion. Without
/// a JSON body it is approved as submitted.
async fn approve_suggestion<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Result<Json<CarparkUpdate>, JsonRejection>,
) -> HateoasResult<WithId<Carpark>> {
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::PUT).with_uri(original_uri.path())
    };

    let update = match body {
        Ok(Json(update)) => update,
        Err(JsonRejection::MissingJsonContentType(_)) => CarparkUpdate::default(),
        Err(why) => return Err(error_context(why.into())),
    };
    parking_client
        .approve_suggestion(Id::new(id), update)
        .await
        .map(|carpark| carpark_hateoas(carpark, base_url).json())
        .map_err(|why| error_context(why.into()))
}

async fn reject_suggestion<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { parking_client, .. }): State<WebState<D>>,
) -> RouteResult<Json<Acknowledgement>> {
    parking_client
        .reject_suggestion(Id::new(id))
        .await
        .map(|_| Acknowledgement::json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}
