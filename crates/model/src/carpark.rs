use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utility::{geo::Coordinate, id::HasId};

use crate::{
    photo::{NewPhoto, Photo, MAX_SUGGESTION_PHOTOS},
    region::is_in_singapore,
    validation::{self, ValidationError, ValidationResult},
    ExampleData, WithDistance, WithId,
};

/// One entry of a proximity search: the carpark and its distance to the
/// search center in meters.
pub type SearchResult = WithDistance<WithId<Carpark>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarparkType {
    /// Residential (HDB) block.
    Hdb,
    Mall,
    Office,
    /// Public or transit carpark.
    Public,
    Other,
}

impl CarparkType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hdb => "HDB",
            Self::Mall => "MALL",
            Self::Office => "OFFICE",
            Self::Public => "PUBLIC",
            Self::Other => "OTHER",
        }
    }
}

impl Default for CarparkType {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for CarparkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown carpark type `{0}`")]
pub struct UnknownCarparkType(pub String);

impl FromStr for CarparkType {
    type Err = UnknownCarparkType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HDB" => Ok(Self::Hdb),
            "MALL" => Ok(Self::Mall),
            "OFFICE" => Ok(Self::Office),
            "PUBLIC" => Ok(Self::Public),
            "OTHER" => Ok(Self::Other),
            _ => Err(UnknownCarparkType(s.to_owned())),
        }
    }
}

/// A parking location as stored, photos included.
///
/// `total_moto_lots` is tri-state: `None` means the lot count is unknown,
/// `Some(0)` that there are no motorcycle lots.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Carpark {
    pub name: String,
    pub address: String,
    pub town: Option<String>,
    #[serde(flatten)]
    pub location: Coordinate,
    #[serde(rename = "type")]
    pub carpark_type: CarparkType,
    pub motorcycle_allowed: bool,
    pub car_allowed: bool,
    pub total_moto_lots: Option<u32>,
    pub covered: Option<bool>,
    pub pricing_notes: Option<String>,
    pub opening_hours: Option<String>,
    pub entrance_notes: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub photos: Vec<WithId<Photo>>,
}

impl HasId for Carpark {
    type IdType = String;
}

impl Carpark {
    /// Whether a proximity search may return this carpark at all.
    pub fn is_searchable(&self) -> bool {
        self.verified && self.motorcycle_allowed
    }
}

impl ExampleData for Carpark {
    fn example_data() -> Self {
        let now = Utc::now();
        Carpark {
            name: "Orchard Central Motorcycle Parking".to_owned(),
            address: "181 Orchard Road, Singapore 238896".to_owned(),
            town: Some("Orchard".to_owned()),
            location: Coordinate::new(1.3007, 103.8398),
            carpark_type: CarparkType::Mall,
            motorcycle_allowed: true,
            car_allowed: false,
            total_moto_lots: Some(50),
            covered: Some(true),
            pricing_notes: Some("$0.50 per hour".to_owned()),
            opening_hours: Some("24/7".to_owned()),
            entrance_notes: None,
            verified: true,
            created_at: now,
            updated_at: now,
            photos: vec![],
        }
    }
}

/// A validated carpark which has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCarpark {
    pub name: String,
    pub address: String,
    pub town: Option<String>,
    pub location: Coordinate,
    pub carpark_type: CarparkType,
    pub motorcycle_allowed: bool,
    pub car_allowed: bool,
    pub total_moto_lots: Option<u32>,
    pub covered: Option<bool>,
    pub pricing_notes: Option<String>,
    pub opening_hours: Option<String>,
    pub entrance_notes: Option<String>,
    pub verified: bool,
    pub photos: Vec<NewPhoto>,
}

impl NewCarpark {
    /// Materializes the stored form, stamping both timestamps with `now`.
    pub fn into_carpark(self, now: DateTime<Utc>) -> (Carpark, Vec<NewPhoto>) {
        let carpark = Carpark {
            name: self.name,
            address: self.address,
            town: self.town,
            location: self.location,
            carpark_type: self.carpark_type,
            motorcycle_allowed: self.motorcycle_allowed,
            car_allowed: self.car_allowed,
            total_moto_lots: self.total_moto_lots,
            covered: self.covered,
            pricing_notes: self.pricing_notes,
            opening_hours: self.opening_hours,
            entrance_notes: self.entrance_notes,
            verified: self.verified,
            created_at: now,
            updated_at: now,
            photos: vec![],
        };
        (carpark, self.photos)
    }
}

/// Carpark as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarparkDraft {
    pub name: Option<String>,
    pub address: Option<String>,
    pub town: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "type")]
    pub carpark_type: Option<CarparkType>,
    pub motorcycle_allowed: Option<bool>,
    pub car_allowed: Option<bool>,
    pub total_moto_lots: Option<u32>,
    pub covered: Option<bool>,
    pub pricing_notes: Option<String>,
    pub opening_hours: Option<String>,
    pub entrance_notes: Option<String>,
    pub verified: Option<bool>,
    #[serde(default)]
    pub photos: Vec<NewPhoto>,
}

impl CarparkDraft {
    /// Validates a public suggestion. Suggestions need a town, must lie in
    /// Singapore and always start unverified.
    pub fn into_suggestion(self) -> ValidationResult<NewCarpark> {
        let town = validation::non_blank("town", self.town.clone())?;
        let photos = validate_photos(self.photos.clone())?;
        let mut carpark = self.into_new_carpark(false, false)?;
        if !is_in_singapore(&carpark.location) {
            return Err(ValidationError::OutsideRegion(carpark.location));
        }
        carpark.town = Some(town);
        carpark.covered = carpark.covered.or(Some(false));
        carpark.verified = false;
        carpark.photos = photos;
        Ok(carpark)
    }

    /// Validates an administrative entry, which is verified unless stated
    /// otherwise.
    pub fn into_admin_entry(self) -> ValidationResult<NewCarpark> {
        let photos = validate_photos(self.photos.clone())?;
        let mut carpark = self.into_new_carpark(true, true)?;
        carpark.photos = photos;
        Ok(carpark)
    }

    fn into_new_carpark(
        self,
        default_car_allowed: bool,
        default_verified: bool,
    ) -> ValidationResult<NewCarpark> {
        Ok(NewCarpark {
            name: validation::non_blank("name", self.name)?,
            address: validation::non_blank("address", self.address)?,
            location: validation::coordinate(self.lat, self.lng)?,
            town: validation::optional_text(self.town),
            carpark_type: self.carpark_type.unwrap_or_default(),
            motorcycle_allowed: self.motorcycle_allowed.unwrap_or(true),
            car_allowed: self.car_allowed.unwrap_or(default_car_allowed),
            total_moto_lots: validation::moto_lots(self.total_moto_lots)?,
            covered: self.covered,
            pricing_notes: validation::optional_text(self.pricing_notes),
            opening_hours: validation::optional_text(self.opening_hours),
            entrance_notes: validation::optional_text(self.entrance_notes),
            verified: self.verified.unwrap_or(default_verified),
            photos: vec![],
        })
    }
}

fn validate_photos(photos: Vec<NewPhoto>) -> ValidationResult<Vec<NewPhoto>> {
    if photos.len() > MAX_SUGGESTION_PHOTOS {
        return Err(ValidationError::TooManyPhotos {
            max: MAX_SUGGESTION_PHOTOS,
            given: photos.len(),
        });
    }
    photos
        .into_iter()
        .enumerate()
        .map(|(index, photo)| {
            let url = photo.url.trim().to_owned();
            if url.is_empty() {
                return Err(ValidationError::PhotoWithoutUrl(index + 1));
            }
            Ok(NewPhoto {
                url,
                caption: validation::optional_text(photo.caption),
                taken_at: photo.taken_at,
            })
        })
        .collect()
}

/// Partial update of a carpark. An absent field is left unchanged; for
/// nullable fields an explicit `null` clears the stored value.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarparkUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub town: Option<Option<String>>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(rename = "type")]
    pub carpark_type: Option<CarparkType>,
    pub motorcycle_allowed: Option<bool>,
    pub car_allowed: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<u32>")]
    pub total_moto_lots: Option<Option<u32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<bool>")]
    pub covered: Option<Option<bool>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub pricing_notes: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub opening_hours: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schemars(with = "Option<String>")]
    pub entrance_notes: Option<Option<String>>,
    pub verified: Option<bool>,
}

impl CarparkUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validation::non_blank("name", Some(name.clone()))?;
        }
        if let Some(address) = &self.address {
            validation::non_blank("address", Some(address.clone()))?;
        }
        if self.lat.is_some() || self.lng.is_some() {
            // a lone lat or lng is checked against a valid placeholder
            validation::coordinate(self.lat.or(Some(0.0)), self.lng.or(Some(0.0)))?;
        }
        if let Some(lots) = self.total_moto_lots {
            validation::moto_lots(lots)?;
        }
        Ok(())
    }

    /// Validates the update and writes it onto `carpark`.
    pub fn apply_to(self, carpark: &mut Carpark, now: DateTime<Utc>) -> ValidationResult<()> {
        self.validate()?;

        if let Some(name) = self.name {
            carpark.name = name.trim().to_owned();
        }
        if let Some(address) = self.address {
            carpark.address = address.trim().to_owned();
        }
        if let Some(town) = self.town {
            carpark.town = validation::optional_text(town);
        }
        if let Some(latitude) = self.lat {
            carpark.location.latitude = latitude;
        }
        if let Some(longitude) = self.lng {
            carpark.location.longitude = longitude;
        }
        if let Some(carpark_type) = self.carpark_type {
            carpark.carpark_type = carpark_type;
        }
        if let Some(motorcycle_allowed) = self.motorcycle_allowed {
            carpark.motorcycle_allowed = motorcycle_allowed;
        }
        if let Some(car_allowed) = self.car_allowed {
            carpark.car_allowed = car_allowed;
        }
        if let Some(total_moto_lots) = self.total_moto_lots {
            carpark.total_moto_lots = total_moto_lots;
        }
        if let Some(covered) = self.covered {
            carpark.covered = covered;
        }
        if let Some(pricing_notes) = self.pricing_notes {
            carpark.pricing_notes = validation::optional_text(pricing_notes);
        }
        if let Some(opening_hours) = self.opening_hours {
            carpark.opening_hours = validation::optional_text(opening_hours);
        }
        if let Some(entrance_notes) = self.entrance_notes {
            carpark.entrance_notes = validation::optional_text(entrance_notes);
        }
        if let Some(verified) = self.verified {
            carpark.verified = verified;
        }
        carpark.updated_at = now;
        Ok(())
    }
}
