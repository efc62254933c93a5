//! Proximity search: which motorcycle parking lies within a radius around
//! a point.
//!
//! The candidate provider pre-filters by bounding box, which overselects
//! near the corners of the box. The exact haversine distance then decides
//! which candidates are really within the radius.

use async_trait::async_trait;
use model::{
    carpark::{Carpark, SearchResult},
    photo::SEARCH_RESULT_PHOTOS,
    WithDistance, WithId,
};
use thiserror::Error;
use utility::geo::{BoundingBox, Coordinate};

use crate::database::{self, CarparkRepo, DatabaseError};

/// Radius used when a caller does not ask for a specific one.
pub const DEFAULT_RADIUS_METERS: f64 = 2000.0;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search center {0}")]
    InvalidCenter(Coordinate),

    #[error("invalid search radius {0} m")]
    InvalidRadius(f64),

    #[error("candidates within {bounding_box} (radius {radius_meters} m) are unavailable")]
    ProviderUnavailable {
        bounding_box: BoundingBox,
        radius_meters: f64,
        #[source]
        source: DatabaseError,
    },
}

impl SearchError {
    /// Whether the caller has to fix its request rather than retry it.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidCenter(_) | Self::InvalidRadius(_))
    }
}

#[async_trait]
pub trait CandidateProvider {
    /// Verified, motorcycle-allowed carparks inside the box (inclusive).
    async fn candidates(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> database::Result<Vec<WithId<Carpark>>>;
}

#[async_trait]
impl<R> CandidateProvider for R
where
    R: CarparkRepo + Send,
{
    async fn candidates(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> database::Result<Vec<WithId<Carpark>>> {
        self.carparks_in_box(bounding_box).await
    }
}

/// Returns every eligible carpark within `radius_meters` of `center`,
/// nearest first. Carparks at equal distance keep the provider's order.
///
/// A radius of zero is accepted and matches carparks exactly at the center.
pub async fn search<P>(
    center: Coordinate,
    radius_meters: f64,
    provider: &mut P,
) -> Result<Vec<SearchResult>, SearchError>
where
    P: CandidateProvider + Send + ?Sized,
{
    if !center.is_valid() {
        return Err(SearchError::InvalidCenter(center));
    }
    if !radius_meters.is_finite() || radius_meters < 0.0 {
        return Err(SearchError::InvalidRadius(radius_meters));
    }

    let bounding_box = BoundingBox::around(&center, radius_meters);
    let candidates = provider.candidates(&bounding_box).await.map_err(|source| {
        SearchError::ProviderUnavailable {
            bounding_box,
            radius_meters,
            source,
        }
    })?;
    let candidate_count = candidates.len();

    let mut results = candidates
        .into_iter()
        // providers are trusted to filter, but unverified entries must never leak
        .filter(|candidate| candidate.content.is_searchable())
        .map(|mut candidate| {
            candidate.content.photos.truncate(SEARCH_RESULT_PHOTOS);
            WithDistance::new(candidate.content.location.distance_to(&center), candidate)
        })
        .filter(|result| result.distance_meters <= radius_meters)
        .collect::<Vec<_>>();
    results.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));

    log::debug!(
        "search around {} within {} m: {} of {} candidates",
        center,
        radius_meters,
        results.len(),
        candidate_count
    );
    Ok(results)
}
