use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    carpark::{Carpark, CarparkDraft, CarparkUpdate},
    WithId,
};
use parking::database::Database;
use utility::{id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema_no_example, Acknowledgement, HateoasResult,
        RouteErrorResponse, RouteResult, VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::admin::resource!("/carparks{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/", get(get_carparks::<D>).post(create_carpark::<D>))
        .route("/schema", get(schema_no_example::<CarparkUpdate>))
        .route(
            "/:id",
            get(get_carpark::<D>)
                .put(update_carpark::<D>)
                .delete(delete_carpark::<D>),
        )
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_carparks<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Carpark>>>> {
    parking_client
        .list_carparks()
        .await
        .map(|carparks| {
            carparks
                .into_iter()
                .map(|carpark| carpark_hateoas(carpark, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_carpark<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Carpark>> {
    parking_client
        .get_carpark(Id::new(id))
        .await
        .map(|carpark| carpark_hateoas(carpark, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_carpark<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Result<Json<CarparkDraft>, JsonRejection>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Carpark>>>)> {
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::POST).with_uri(original_uri.path())
    };

    let Json(draft) = body.map_err(|why| error_context(why.into()))?;
    parking_client
        .create_carpark(draft)
        .await
        .map(|carpark| (StatusCode::CREATED, carpark_hateoas(carpark, base_url).json()))
        .map_err(|why| error_context(why.into()))
}

async fn update_carpark<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    body: Result<Json<CarparkUpdate>, JsonRejection>,
) -> HateoasResult<WithId<Carpark>> {
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::PUT).with_uri(original_uri.path())
    };

    let Json(update) = body.map_err(|why| error_context(why.into()))?;
    parking_client
        .update_carpark(Id::new(id), update)
        .await
        .map(|carpark| carpark_hateoas(carpark, base_url).json())
        .map_err(|why| error_context(why.into()))
}

async fn delete_carpark<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { parking_client, .. }): State<WebState<D>>,
) -> RouteResult<Json<Acknowledgement>> {
    parking_client
        .delete_carpark(Id::new(id))
        .await
        .map(|_| Acknowledgement::json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

pub(crate) fn carpark_hateoas(
    carpark: WithId<Carpark>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Carpark>> {
    let id = carpark.id.clone();
    let location = carpark.content.location;
    hateoas::Response::builder(carpark, base_url)
        .link("self", resource!("/{}", id))
        .location_links(&location)
        .build()
}
