//! Client for the Google Geocoding API, restricted to Singapore.

use std::{borrow::Cow, env, fmt};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utility::geo::Coordinate;

pub const GOOGLE_MAPS_API_URL: &str = "https://maps.googleapis.com/maps/api";

const REGION: &str = "sg";
const REGION_NAME: &str = "Singapore";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no results")]
    NoResults,

    #[error("API quota exceeded")]
    QuotaExceeded,

    #[error("request denied: {}", .0.as_deref().unwrap_or("check API key permissions and restrictions"))]
    RequestDenied(Option<String>),

    #[error("geocoding failed: {status} - {}", .message.as_deref().unwrap_or("unknown error"))]
    Other {
        status: String,
        message: Option<String>,
    },

    #[error("geocoding request failed: {0}")]
    Transport(reqwest::Error),

    #[error("invalid response ({status_code})")]
    InvalidResponse { status_code: reqwest::StatusCode },
}

impl From<reqwest::Error> for GeocodeError {
    fn from(why: reqwest::Error) -> Self {
        // the url carries the api key
        Self::Transport(why.without_url())
    }
}

/// Best match for a query.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Geocode {
    #[serde(flatten)]
    pub location: Coordinate,
    pub formatted_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResponseResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponseResult {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Appends the region name unless the query already mentions it.
pub fn with_region_hint(query: &str) -> Cow<'_, str> {
    if query.to_lowercase().contains(&REGION_NAME.to_lowercase()) {
        Cow::Borrowed(query)
    } else {
        Cow::Owned(format!("{query}, {REGION_NAME}"))
    }
}

/// Maps the provider's status onto a result.
pub fn interpret(response: GeocodeResponse) -> Result<Geocode, GeocodeError> {
    match response.status.as_str() {
        "REQUEST_DENIED" => Err(GeocodeError::RequestDenied(response.error_message)),
        "OVER_QUERY_LIMIT" => Err(GeocodeError::QuotaExceeded),
        "ZERO_RESULTS" => Err(GeocodeError::NoResults),
        "OK" => response
            .results
            .into_iter()
            .next()
            .map(|result| Geocode {
                location: Coordinate::new(
                    result.geometry.location.lat,
                    result.geometry.location.lng,
                ),
                formatted_address: result.formatted_address,
            })
            .ok_or(GeocodeError::NoResults),
        _ => Err(GeocodeError::Other {
            status: response.status,
            message: response.error_message,
        }),
    }
}

#[derive(Clone)]
pub struct GeocodingClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for GeocodingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodingClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeocodingClient {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GOOGLE_MAPS_API_URL.to_owned(),
            http: reqwest::Client::new(),
        }
    }

    /// Reads the key from `GOOGLE_MAPS_API_KEY`. `None` if unset or empty.
    pub fn from_env() -> Option<Self> {
        env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn geocode(&self, query: &str) -> Result<Geocode, GeocodeError> {
        let address = with_region_hint(query);
        log::debug!("geocoding `{}`", address);

        let response = self
            .http
            .get(format!("{}/geocode/json", self.base_url))
            .query(&[
                ("address", &*address),
                ("key", self.api_key.as_str()),
                ("region", REGION),
            ])
            .send()
            .await?;

        let status_code = response.status();
        if !status_code.is_success() {
            log::error!("geocoding api answered with http status {}", status_code);
            return Err(GeocodeError::InvalidResponse { status_code });
        }

        let result = interpret(response.json().await?);
        if let Err(why) = &result {
            log::warn!("geocoding `{}` failed: {}", address, why);
        }
        result
    }
}
