//! Moderation and data maintenance. Every route below `/admin` requires the
//! admin key, see `middleware::admin_key`.

use axum::{routing::on, Router};
use parking::database::Database;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

mod carparks;
mod suggestions;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/admin{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .nest_service("/carparks", carparks::routes(state.clone()))
        .nest_service("/suggestions", suggestions::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
