use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    carpark::Carpark,
    photo::{NewPhoto, Photo},
    WithId,
};
use parking::database::{PhotoRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::DatabaseRow;
use crate::{
    queries::photo::{delete_for_carpark, insert},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: String,
    pub carpark_id: String,
    pub url: String,
    pub caption: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DatabaseRow for PhotoRow {
    type Model = Photo;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id.clone())
    }

    fn to_model(self) -> Result<Self::Model> {
        Ok(Photo {
            url: self.url,
            caption: self.caption,
            taken_at: self.taken_at,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl PhotoRepo for PgDatabaseAutocommit {
    async fn insert_photo(
        &mut self,
        carpark: &Id<Carpark>,
        photo: NewPhoto,
        created_at: DateTime<Utc>,
    ) -> Result<WithId<Photo>> {
        insert(&self.pool, carpark, photo, created_at).await
    }

    async fn delete_photos(&mut self, carpark: &Id<Carpark>) -> Result<u64> {
        delete_for_carpark(&self.pool, carpark).await
    }
}

#[async_trait]
impl<'a> PhotoRepo for PgDatabaseTransaction<'a> {
    async fn insert_photo(
        &mut self,
        carpark: &Id<Carpark>,
        photo: NewPhoto,
        created_at: DateTime<Utc>,
    ) -> Result<WithId<Photo>> {
        insert(&mut *self.tx, carpark, photo, created_at).await
    }

    async fn delete_photos(&mut self, carpark: &Id<Carpark>) -> Result<u64> {
        delete_for_carpark(&mut *self.tx, carpark).await
    }
}
