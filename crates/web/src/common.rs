use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Query, Request,
    },
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use geocoding::GeocodeError;
use model::ExampleData;
use parking::RequestError;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::hateoas;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VecResponse<T> {
    pub data: Vec<T>,
}

impl<T> VecResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn hateoas(self) -> hateoas::Response<Self> {
        hateoas::Response::new(self)
    }

    pub fn json(self) -> Json<Self> {
        Json(self)
    }
}

/// Body of successful deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
}

impl Acknowledgement {
    pub fn json() -> Json<Self> {
        Json(Self { success: true })
    }
}

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    Query(params): Query<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn schema_no_example<T: JsonSchema>(
    Query(_params): Query<SchemaParams>,
) -> impl IntoResponse {
    Json(schema_for!(T))
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

// - Commonly used responeses -

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Only sent while the server runs in development mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_information: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            detailed_information: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn forbidden(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN)
            .with_method(method)
            .with_uri(uri)
            .with_message("Access Forbidden")
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("i dunno what happened here :/");
        self.with_message(message)
    }

    pub fn with_detailed_information(mut self, message: impl Into<String>) -> Self {
        self.detailed_information = Some(message.into());
        self
    }

    pub fn without_detailed_information(mut self) -> Self {
        self.detailed_information = None;
        self
    }

    fn internal(why: impl std::fmt::Display) -> Self {
        log::error!("request failed: {}", why);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_default_message()
            .with_detailed_information(why.to_string())
    }
}

impl From<RequestError> for RouteErrorResponse {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::NotFound => Self::new(StatusCode::NOT_FOUND)
                .with_message("The requested carpark does not exist."),
            RequestError::Validation(why) => {
                Self::new(StatusCode::BAD_REQUEST).with_message(why.to_string())
            }
            RequestError::Search(why) if why.is_invalid_input() => {
                Self::new(StatusCode::BAD_REQUEST).with_message(why.to_string())
            }
            RequestError::Search(why) => {
                let detail = match std::error::Error::source(&why) {
                    Some(source) => format!("{why}: {source}"),
                    None => why.to_string(),
                };
                Self::internal(detail).with_message("Failed to search carparks.")
            }
            RequestError::Other(why) => Self::internal(why),
        }
    }
}

impl From<GeocodeError> for RouteErrorResponse {
    fn from(value: GeocodeError) -> Self {
        match value {
            GeocodeError::NoResults => Self::new(StatusCode::NOT_FOUND)
                .with_message("No results found for this location."),
            GeocodeError::QuotaExceeded => Self::new(StatusCode::TOO_MANY_REQUESTS)
                .with_message("API quota exceeded. Please try again later."),
            why @ GeocodeError::RequestDenied(_) => {
                log::error!("{}", why);
                Self::new(StatusCode::FORBIDDEN)
                    .with_message("Geocoding request denied.")
                    .with_detailed_information(why.to_string())
            }
            why => Self::internal(why).with_message("Failed to geocode location."),
        }
    }
}

impl From<QueryRejection> for RouteErrorResponse {
    fn from(value: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST)
            .with_default_message()
            .with_detailed_information(value.body_text())
    }
}

impl From<JsonRejection> for RouteErrorResponse {
    fn from(value: JsonRejection) -> Self {
        Self::new(value.status())
            .with_message("The request body is not a valid carpark.")
            .with_detailed_information(value.body_text())
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code, Json(&self)).into_response();
        // read by the error details middleware
        response.extensions_mut().insert(self);
        response
    }
}
