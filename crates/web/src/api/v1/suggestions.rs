use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    http::{Method, StatusCode},
    routing::{get, on, post},
    Json, Router,
};
use model::carpark::{Carpark, CarparkDraft};
use parking::database::Database;
use serde::Serialize;
use utility::id::Id;

use crate::{
    common::{
        route_not_found, schema_no_example, RouteErrorResponse, RouteResult,
        METHOD_FILTER_ALL,
    },
    WebState,
};

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/", post(submit_suggestion::<D>))
        .route("/schema", get(schema_no_example::<CarparkDraft>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Serialize)]
pub(crate) struct SuggestionReceipt {
    success: bool,
    message: String,
    id: Id<Carpark>,
}

async fn submit_suggestion<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { parking_client, .. }): State<WebState<D>>,
    body: Result<Json<CarparkDraft>, JsonRejection>,
) -> RouteResult<(StatusCode, Json<SuggestionReceipt>)> {
    let error_context = |why: RouteErrorResponse| {
        why.with_method(&Method::POST).with_uri(original_uri.path())
    };

    let Json(draft) = body.map_err(|why| error_context(why.into()))?;
    let id = parking_client
        .submit_suggestion(draft)
        .await
        .map_err(|why| error_context(why.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(SuggestionReceipt {
            success: true,
            message: "Thank you! Your suggestion has been submitted for review.".to_owned(),
            id,
        }),
    ))
}
