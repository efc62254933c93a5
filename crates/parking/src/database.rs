use std::{error, result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    carpark::Carpark,
    photo::{NewPhoto, Photo},
    BoundingBox, WithId,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("entry not found")]
    NotFound,
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait CarparkRepo {
    /// Returns every verified carpark which allows motorcycles and lies
    /// within `bounding_box`, bounds inclusive. Each carpark carries its
    /// newest photos, at most `model::photo::SEARCH_RESULT_PHOTOS`.
    ///
    /// The returned set is not ordered.
    async fn carparks_in_box(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> Result<Vec<WithId<Carpark>>>;

    /// A single carpark with all of its photos, newest first.
    async fn get_carpark(&mut self, id: &Id<Carpark>) -> Result<WithId<Carpark>>;

    /// All carparks ordered by name.
    async fn list_carparks(&mut self) -> Result<Vec<WithId<Carpark>>>;

    /// Unverified carparks, newest first.
    async fn pending_carparks(&mut self) -> Result<Vec<WithId<Carpark>>>;

    /// Stores a new carpark. Its photos are ignored, see `PhotoRepo`.
    async fn insert_carpark(&mut self, carpark: Carpark) -> Result<WithId<Carpark>>;

    /// Overwrites all fields of an existing carpark except its photos and
    /// its creation time.
    async fn update_carpark(
        &mut self,
        carpark: WithId<Carpark>,
    ) -> Result<WithId<Carpark>>;

    async fn delete_carpark(&mut self, id: &Id<Carpark>) -> Result<()>;

    async fn count_carparks(&mut self) -> Result<u64>;
}

#[async_trait]
pub trait PhotoRepo {
    async fn insert_photo(
        &mut self,
        carpark: &Id<Carpark>,
        photo: NewPhoto,
        created_at: DateTime<Utc>,
    ) -> Result<WithId<Photo>>;

    /// Removes all photos of a carpark and returns how many there were.
    async fn delete_photos(&mut self, carpark: &Id<Carpark>) -> Result<u64>;
}

pub trait DatabaseOperations: CarparkRepo + PhotoRepo {}

impl<T: CarparkRepo + PhotoRepo> DatabaseOperations for T {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// trait to implement a carpark database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
