use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{carpark::Carpark, BoundingBox, Coordinate, WithId};
use parking::database::{CarparkRepo, DatabaseError, Result};
use sqlx::{pool::PoolConnection, prelude::FromRow, Postgres};
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::carpark::{count, delete, get, get_all, get_pending, in_box, insert, update},
    queries::convert_error,
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct CarparkRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub town: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub carpark_type: String,
    pub motorcycle_allowed: bool,
    pub car_allowed: bool,
    pub total_moto_lots: Option<i32>,
    pub covered: Option<bool>,
    pub pricing_notes: Option<String>,
    pub opening_hours: Option<String>,
    pub entrance_notes: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DatabaseRow for CarparkRow {
    type Model = Carpark;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id.clone())
    }

    fn to_model(self) -> Result<Self::Model> {
        Ok(Carpark {
            carpark_type: self.carpark_type.parse().map_err(DatabaseError::other)?,
            total_moto_lots: self
                .total_moto_lots
                .map(u32::try_from)
                .transpose()
                .map_err(DatabaseError::other)?,
            name: self.name,
            address: self.address,
            town: self.town,
            location: Coordinate::new(self.latitude, self.longitude),
            motorcycle_allowed: self.motorcycle_allowed,
            car_allowed: self.car_allowed,
            covered: self.covered,
            pricing_notes: self.pricing_notes,
            opening_hours: self.opening_hours,
            entrance_notes: self.entrance_notes,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
            photos: vec![],
        })
    }
}

impl PgDatabaseAutocommit {
    /// Statements that belong together run on one pooled connection.
    async fn connection(&self) -> Result<PoolConnection<Postgres>> {
        self.pool.acquire().await.map_err(convert_error)
    }
}

#[async_trait]
impl CarparkRepo for PgDatabaseAutocommit {
    async fn carparks_in_box(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> Result<Vec<WithId<Carpark>>> {
        in_box(&mut *self.connection().await?, bounding_box).await
    }

    async fn get_carpark(&mut self, id: &Id<Carpark>) -> Result<WithId<Carpark>> {
        get(&mut *self.connection().await?, id).await
    }

    async fn list_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        get_all(&mut *self.connection().await?).await
    }

    async fn pending_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        get_pending(&mut *self.connection().await?).await
    }

    async fn insert_carpark(&mut self, carpark: Carpark) -> Result<WithId<Carpark>> {
        insert(&self.pool, carpark).await
    }

    async fn update_carpark(
        &mut self,
        carpark: WithId<Carpark>,
    ) -> Result<WithId<Carpark>> {
        update(&mut *self.connection().await?, carpark).await
    }

    async fn delete_carpark(&mut self, id: &Id<Carpark>) -> Result<()> {
        delete(&self.pool, id).await
    }

    async fn count_carparks(&mut self) -> Result<u64> {
        count(&self.pool).await
    }
}

#[async_trait]
impl<'a> CarparkRepo for PgDatabaseTransaction<'a> {
    async fn carparks_in_box(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> Result<Vec<WithId<Carpark>>> {
        in_box(&mut *self.tx, bounding_box).await
    }

    async fn get_carpark(&mut self, id: &Id<Carpark>) -> Result<WithId<Carpark>> {
        get(&mut *self.tx, id).await
    }

    async fn list_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        get_all(&mut *self.tx).await
    }

    async fn pending_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        get_pending(&mut *self.tx).await
    }

    async fn insert_carpark(&mut self, carpark: Carpark) -> Result<WithId<Carpark>> {
        insert(&mut *self.tx, carpark).await
    }

    async fn update_carpark(
        &mut self,
        carpark: WithId<Carpark>,
    ) -> Result<WithId<Carpark>> {
        update(&mut *self.tx, carpark).await
    }

    async fn delete_carpark(&mut self, id: &Id<Carpark>) -> Result<()> {
        delete(&mut *self.tx, id).await
    }

    async fn count_carparks(&mut self) -> Result<u64> {
        count(&mut *self.tx).await
    }
}
