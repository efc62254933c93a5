use std::io;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use model::{
    carpark::Carpark,
    photo::{NewPhoto, Photo},
    BoundingBox, WithId,
};
use parking::{
    database::{
        CarparkRepo, Database, DatabaseAutocommit, DatabaseError, DatabaseTransaction,
        PhotoRepo, Result,
    },
    Client,
};
use serde_json::Value;
use tower::ServiceExt;
use utility::id::Id;
use web::{app, WebState};

/// Store whose every operation fails the way a dropped connection does.
#[derive(Clone)]
struct UnreachableDatabase;

fn refused() -> DatabaseError {
    DatabaseError::other(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "pg at 10.0.0.5 refused",
    ))
}

#[async_trait]
impl CarparkRepo for UnreachableDatabase {
    async fn carparks_in_box(&mut self, _: &BoundingBox) -> Result<Vec<WithId<Carpark>>> {
        Err(refused())
    }

    async fn get_carpark(&mut self, _: &Id<Carpark>) -> Result<WithId<Carpark>> {
        Err(refused())
    }

    async fn list_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        Err(refused())
    }

    async fn pending_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        Err(refused())
    }

    async fn insert_carpark(&mut self, _: Carpark) -> Result<WithId<Carpark>> {
        Err(refused())
    }

    async fn update_carpark(&mut self, _: WithId<Carpark>) -> Result<WithId<Carpark>> {
        Err(refused())
    }

    async fn delete_carpark(&mut self, _: &Id<Carpark>) -> Result<()> {
        Err(refused())
    }

    async fn count_carparks(&mut self) -> Result<u64> {
        Err(refused())
    }
}

#[async_trait]
impl PhotoRepo for UnreachableDatabase {
    async fn insert_photo(
        &mut self,
        _: &Id<Carpark>,
        _: NewPhoto,
        _: DateTime<Utc>,
    ) -> Result<WithId<Photo>> {
        Err(refused())
    }

    async fn delete_photos(&mut self, _: &Id<Carpark>) -> Result<u64> {
        Err(refused())
    }
}

#[async_trait]
impl DatabaseTransaction for UnreachableDatabase {
    async fn commit(self) -> Result<()> {
        Err(refused())
    }
}

impl DatabaseAutocommit for UnreachableDatabase {}

#[async_trait]
impl Database for UnreachableDatabase {
    type Transaction = Self;
    type Autocommit = Self;

    async fn transaction(&self) -> Result<Self::Transaction> {
        Err(refused())
    }

    fn auto(&self) -> Self::Autocommit {
        self.clone()
    }
}

fn state(development: bool) -> WebState<UnreachableDatabase> {
    WebState {
        parking_client: Client::new(UnreachableDatabase),
        geocoding_client: None,
        admin_key: None,
        development,
    }
}

async fn search(development: bool) -> (StatusCode, Value) {
    let request = Request::get("/api/v1/carparks/search?lat=1.3521&lng=103.8198")
        .body(Body::empty())
        .unwrap();
    let response = app(state(development)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn unavailable_store_fails_the_search_without_details() {
    let (status, body) = search(false).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to search carparks.");
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], "/api/v1/carparks/search");
    assert!(body.get("detailedInformation").is_none());
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unavailable_store_is_described_in_development() {
    let (status, body) = search(true).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to search carparks.");
    let details = body["detailedInformation"].as_str().unwrap();
    assert!(details.contains("radius 2000 m"), "{details}");
    assert!(details.contains("unavailable"), "{details}");
    assert!(details.contains("10.0.0.5 refused"), "{details}");
}
