use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::{Header, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::common::RouteErrorResponse;

static ADMIN_KEY_HEADER: HeaderName = HeaderName::from_static("x-admin-key");

/// The `x-admin-key` request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminKey(pub String);

impl Header for AdminKey {
    fn name() -> &'static HeaderName {
        &ADMIN_KEY_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|value| value.to_str().ok())
            .map(|value| AdminKey(value.to_owned()))
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminKeyQuery {
    key: Option<String>,
}

/// Lets a request pass only if it carries the configured admin key, either
/// as `key` query parameter or as `x-admin-key` header. The query parameter
/// is checked first. Without a configured key nobody gets in.
pub async fn require_admin_key(
    State(admin_key): State<Option<Arc<str>>>,
    OriginalUri(original_uri): OriginalUri,
    query: Option<Query<AdminKeyQuery>>,
    header: Option<TypedHeader<AdminKey>>,
    req: Request,
    next: Next,
) -> Response {
    let provided = query
        .and_then(|Query(query)| query.key)
        .filter(|key| !key.is_empty())
        .or_else(|| header.map(|TypedHeader(AdminKey(key))| key))
        .filter(|key| !key.is_empty());

    match (admin_key, provided) {
        (Some(expected), Some(provided)) if *expected == *provided => next.run(req).await,
        (expected, _) => {
            if expected.is_none() {
                log::warn!(
                    "admin access to {} denied, no admin key configured",
                    original_uri.path()
                );
            } else {
                log::info!("admin access to {} denied", original_uri.path());
            }
            RouteErrorResponse::forbidden(req.method(), original_uri.path()).into_response()
        }
    }
}
