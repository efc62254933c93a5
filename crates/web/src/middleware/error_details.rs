use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::common::RouteErrorResponse;

/// Outside of development mode error responses lose their detailed
/// information. The detail has been logged when the error was created.
pub async fn redact_error_details(
    State(development): State<bool>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    if development {
        return response;
    }
    match response.extensions_mut().remove::<RouteErrorResponse>() {
        Some(error) if error.detailed_information.is_some() => {
            error.without_detailed_information().into_response()
        }
        _ => response,
    }
}
