//! A database kept in process memory.
//!
//! Transactions hold the store lock until they are committed or dropped, so
//! they are serialized. Dropping a transaction without commit rolls back
//! everything it wrote.

use std::{cmp::Reverse, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use model::{
    carpark::Carpark,
    photo::{NewPhoto, Photo, SEARCH_RESULT_PHOTOS},
    BoundingBox, WithId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use utility::{id::Id, let_also::LetAlso};

use crate::database::{
    CarparkRepo, Database, DatabaseAutocommit, DatabaseError, DatabaseTransaction,
    PhotoRepo, Result,
};

#[derive(Debug, Clone, Default)]
struct State {
    next_id: u64,
    carparks: IndexMap<String, Carpark>,
    /// Insertion order, oldest first. Carpark id and photo.
    photos: Vec<(String, WithId<Photo>)>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Photos of a carpark, newest first.
    fn photos_of(&self, carpark: &str, limit: Option<usize>) -> Vec<WithId<Photo>> {
        let mut photos = self
            .photos
            .iter()
            .rev()
            .filter(|(owner, _)| owner == carpark)
            .map(|(_, photo)| photo.clone())
            .collect::<Vec<_>>();
        photos.sort_by_key(|photo| Reverse(photo.content.created_at));
        if let Some(limit) = limit {
            photos.truncate(limit);
        }
        photos
    }

    fn with_photos(
        &self,
        id: &str,
        carpark: &Carpark,
        limit: Option<usize>,
    ) -> WithId<Carpark> {
        let mut carpark = carpark.clone();
        carpark.photos = self.photos_of(id, limit);
        WithId::new(Id::new(id.to_owned()), carpark)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Both the autocommit handle and a transaction. Outside of a transaction
/// every operation locks the store on its own.
pub struct MemoryConnection {
    state: Arc<Mutex<State>>,
    transaction: Option<Transaction>,
}

struct Transaction {
    guard: OwnedMutexGuard<State>,
    rollback: State,
}

impl MemoryConnection {
    async fn run<R, F>(&mut self, action: F) -> R
    where
        F: FnOnce(&mut State) -> R + Send,
    {
        match &mut self.transaction {
            Some(transaction) => action(&mut *transaction.guard),
            None => action(&mut *self.state.lock().await),
        }
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        if let Some(mut transaction) = self.transaction.take() {
            *transaction.guard = transaction.rollback;
        }
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryConnection;
    type Autocommit = MemoryConnection;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let guard = self.state.clone().lock_owned().await;
        let rollback = guard.clone();
        Ok(MemoryConnection {
            state: self.state.clone(),
            transaction: Some(Transaction { guard, rollback }),
        })
    }

    fn auto(&self) -> Self::Autocommit {
        MemoryConnection {
            state: self.state.clone(),
            transaction: None,
        }
    }
}

#[async_trait]
impl DatabaseTransaction for MemoryConnection {
    async fn commit(mut self) -> Result<()> {
        // releases the lock without rolling back
        self.transaction.take();
        Ok(())
    }
}

impl DatabaseAutocommit for MemoryConnection {}

#[async_trait]
impl CarparkRepo for MemoryConnection {
    async fn carparks_in_box(
        &mut self,
        bounding_box: &BoundingBox,
    ) -> Result<Vec<WithId<Carpark>>> {
        let bounding_box = *bounding_box;
        self.run(move |state| {
            state
                .carparks
                .iter()
                .filter(|(_, carpark)| {
                    carpark.is_searchable() && bounding_box.contains(&carpark.location)
                })
                .map(|(id, carpark)| {
                    state.with_photos(id, carpark, Some(SEARCH_RESULT_PHOTOS))
                })
                .collect::<Vec<_>>()
        })
        .await
        .let_owned(Ok)
    }

    async fn get_carpark(&mut self, id: &Id<Carpark>) -> Result<WithId<Carpark>> {
        let id = id.raw();
        self.run(move |state| {
            state
                .carparks
                .get(&id)
                .map(|carpark| state.with_photos(&id, carpark, None))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn list_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        self.run(|state| {
            let mut carparks = state
                .carparks
                .iter()
                .map(|(id, carpark)| state.with_photos(id, carpark, None))
                .collect::<Vec<_>>();
            carparks.sort_by(|a, b| a.content.name.cmp(&b.content.name));
            carparks
        })
        .await
        .let_owned(Ok)
    }

    async fn pending_carparks(&mut self) -> Result<Vec<WithId<Carpark>>> {
        self.run(|state| {
            let mut carparks = state
                .carparks
                .iter()
                .rev()
                .filter(|(_, carpark)| !carpark.verified)
                .map(|(id, carpark)| state.with_photos(id, carpark, None))
                .collect::<Vec<_>>();
            carparks.sort_by_key(|carpark| Reverse(carpark.content.created_at));
            carparks
        })
        .await
        .let_owned(Ok)
    }

    async fn insert_carpark(&mut self, mut carpark: Carpark) -> Result<WithId<Carpark>> {
        carpark.photos.clear();
        self.run(move |state| {
            let id = state.next_id("carpark");
            state.carparks.insert(id.clone(), carpark.clone());
            WithId::new(Id::new(id), carpark)
        })
        .await
        .let_owned(Ok)
    }

    async fn update_carpark(
        &mut self,
        carpark: WithId<Carpark>,
    ) -> Result<WithId<Carpark>> {
        self.run(move |state| -> Result<WithId<Carpark>> {
            let id = carpark.id.raw();
            let stored = state.carparks.get_mut(&id).ok_or(DatabaseError::NotFound)?;
            let mut updated = carpark.content;
            updated.created_at = stored.created_at;
            updated.photos.clear();
            *stored = updated.clone();
            Ok(state.with_photos(&id, &updated, None))
        })
        .await
    }

    async fn delete_carpark(&mut self, id: &Id<Carpark>) -> Result<()> {
        let id = id.raw();
        self.run(move |state| -> Result<()> {
            state
                .carparks
                .shift_remove(&id)
                .ok_or(DatabaseError::NotFound)?;
            state.photos.retain(|(owner, _)| *owner != id);
            Ok(())
        })
        .await
    }

    async fn count_carparks(&mut self) -> Result<u64> {
        self.run(|state| state.carparks.len() as u64).await.let_owned(Ok)
    }
}

#[async_trait]
impl PhotoRepo for MemoryConnection {
    async fn insert_photo(
        &mut self,
        carpark: &Id<Carpark>,
        photo: NewPhoto,
        created_at: DateTime<Utc>,
    ) -> Result<WithId<Photo>> {
        let carpark = carpark.raw();
        self.run(move |state| {
            if !state.carparks.contains_key(&carpark) {
                return Err(DatabaseError::NotFound);
            }
            let photo = WithId::new(
                Id::new(state.next_id("photo")),
                Photo {
                    url: photo.url,
                    caption: photo.caption,
                    taken_at: photo.taken_at,
                    created_at,
                },
            );
            state.photos.push((carpark, photo.clone()));
            Ok(photo)
        })
        .await
    }

    async fn delete_photos(&mut self, carpark: &Id<Carpark>) -> Result<u64> {
        let carpark = carpark.raw();
        self.run(move |state| {
            let before = state.photos.len();
            state.photos.retain(|(owner, _)| *owner != carpark);
            Ok((before - state.photos.len()) as u64)
        })
        .await
    }
}
