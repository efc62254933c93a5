use chrono::Utc;
use model::{
    carpark::{Carpark, CarparkDraft, CarparkUpdate, NewCarpark, SearchResult},
    WithId,
};
use utility::{geo::Coordinate, id::Id};

use crate::{
    database::{CarparkRepo, Database, DatabaseTransaction, PhotoRepo},
    search::search,
    RequestResult,
};

/// Entry point for every use case of the application. Cheap to clone, all
/// clones share the same database.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub async fn search_nearby(
        &self,
        center: Coordinate,
        radius_meters: f64,
    ) -> RequestResult<Vec<SearchResult>> {
        Ok(search(center, radius_meters, &mut self.database.auto()).await?)
    }

    pub async fn get_carpark(&self, id: Id<Carpark>) -> RequestResult<WithId<Carpark>> {
        Ok(self.database.auto().get_carpark(&id).await?)
    }

    pub async fn list_carparks(&self) -> RequestResult<Vec<WithId<Carpark>>> {
        Ok(self.database.auto().list_carparks().await?)
    }

    pub async fn create_carpark(
        &self,
        draft: CarparkDraft,
    ) -> RequestResult<WithId<Carpark>> {
        let carpark = draft.into_admin_entry()?;
        let result = self.store_new(carpark).await?;
        log::info!("created carpark {} ({})", result.id, result.content.name);
        Ok(result)
    }

    pub async fn update_carpark(
        &self,
        id: Id<Carpark>,
        update: CarparkUpdate,
    ) -> RequestResult<WithId<Carpark>> {
        update.validate()?;
        let mut tx = self.database.transaction().await?;
        let mut carpark = tx.get_carpark(&id).await?;
        update.apply_to(&mut carpark.content, Utc::now())?;
        let result = tx.update_carpark(carpark).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Removes a carpark together with its photos.
    pub async fn delete_carpark(&self, id: Id<Carpark>) -> RequestResult<()> {
        let mut tx = self.database.transaction().await?;
        let photos = tx.delete_photos(&id).await?;
        tx.delete_carpark(&id).await?;
        tx.commit().await?;
        log::info!("deleted carpark {} and {} photos", id, photos);
        Ok(())
    }

    /// Stores a public suggestion, unverified, and returns its id.
    pub async fn submit_suggestion(&self, draft: CarparkDraft) -> RequestResult<Id<Carpark>> {
        let carpark = draft.into_suggestion()?;
        let result = self.store_new(carpark).await?;
        log::info!(
            "received suggestion {} ({}) with {} photos",
            result.id,
            result.content.name,
            result.content.photos.len()
        );
        Ok(result.id)
    }

    pub async fn pending_suggestions(&self) -> RequestResult<Vec<WithId<Carpark>>> {
        Ok(self.database.auto().pending_carparks().await?)
    }

    /// Applies the reviewer's edits. The carpark becomes verified unless the
    /// update says otherwise.
    pub async fn approve_suggestion(
        &self,
        id: Id<Carpark>,
        mut update: CarparkUpdate,
    ) -> RequestResult<WithId<Carpark>> {
        update.verified.get_or_insert(true);
        self.update_carpark(id, update).await
    }

    pub async fn reject_suggestion(&self, id: Id<Carpark>) -> RequestResult<()> {
        self.delete_carpark(id).await
    }

    /// Imports `carparks` if the database holds no carparks yet. Returns the
    /// number of imported carparks.
    pub async fn seed(&self, carparks: Vec<NewCarpark>) -> RequestResult<usize> {
        let mut tx = self.database.transaction().await?;
        if tx.count_carparks().await? > 0 {
            return Ok(0);
        }
        let now = Utc::now();
        let count = carparks.len();
        for carpark in carparks {
            let (carpark, _) = carpark.into_carpark(now);
            tx.insert_carpark(carpark).await?;
        }
        tx.commit().await?;
        Ok(count)
    }

    async fn store_new(&self, carpark: NewCarpark) -> RequestResult<WithId<Carpark>> {
        let now = Utc::now();
        let (carpark, photos) = carpark.into_carpark(now);
        let mut tx = self.database.transaction().await?;
        let mut result = tx.insert_carpark(carpark).await?;
        for photo in photos {
            let photo = tx.insert_photo(&result.id, photo, now).await?;
            result.content.photos.push(photo);
        }
        tx.commit().await?;
        Ok(result)
    }
}
