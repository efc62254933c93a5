use axum::{routing::on, Router};
use parking::database::Database;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    middleware::admin_key::require_admin_key,
    WebState,
};

mod admin;
pub(crate) mod carparks;
mod geocode;
mod locations;
mod suggestions;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    let admin_routes = admin::routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(state.admin_key.clone(), require_admin_key),
    );

    Router::new()
        .nest_service("/carparks", carparks::routes(state.clone()))
        .nest_service("/suggestions", suggestions::routes(state.clone()))
        .nest_service("/geocode", geocode::routes(state.clone()))
        .nest_service("/locations", locations::routes())
        .nest_service("/admin", admin_routes)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
