use std::fmt::Debug;

use indexmap::IndexMap;
use model::{carpark::Carpark, photo::Photo, WithId};
use parking::database::Result;
use serde::Serialize;
use utility::id::{HasId, Id};

pub mod carpark;
pub mod photo;

use carpark::CarparkRow;
use photo::PhotoRow;

pub trait DatabaseRow {
    type Model: Serialize + HasId;

    fn get_id(&self) -> Id<Self::Model>;
    /// Fails when the row holds a value the model can not represent.
    fn to_model(self) -> Result<Self::Model>;
}

pub fn with_id<R: DatabaseRow>(row: R) -> Result<WithId<R::Model>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    Ok(WithId::new(row.get_id(), row.to_model()?))
}

/// Joins carparks with their photos. The photos keep the order in which
/// they are passed.
pub fn with_photos(
    carparks: Vec<CarparkRow>,
    photos: Vec<PhotoRow>,
) -> Result<Vec<WithId<Carpark>>> {
    let mut photos_by_carpark: IndexMap<String, Vec<WithId<Photo>>> = IndexMap::new();
    for photo in photos {
        photos_by_carpark
            .entry(photo.carpark_id.clone())
            .or_default()
            .push(with_id(photo)?);
    }

    carparks
        .into_iter()
        .map(|row| {
            let photos = photos_by_carpark.swap_remove(&row.id).unwrap_or_default();
            let mut carpark = with_id(row)?;
            carpark.content.photos = photos;
            Ok(carpark)
        })
        .collect()
}
