use thiserror::Error;
use utility::geo::Coordinate;

/// Upper bound of a motorcycle lot count, the largest value the store keeps.
pub const MAX_MOTO_LOTS: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must not be blank")]
    Blank(&'static str),

    #[error("invalid coordinate {0}")]
    InvalidCoordinate(Coordinate),

    #[error("coordinate {0} must be within Singapore")]
    OutsideRegion(Coordinate),

    #[error("at most {max} photos may be attached, got {given}")]
    TooManyPhotos { max: usize, given: usize },

    #[error("photo #{0} has no url")]
    PhotoWithoutUrl(usize),

    #[error("at most {max} motorcycle lots are supported, got {given}")]
    TooManyLots { max: u32, given: u32 },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trims `value` and fails when nothing is left.
pub(crate) fn non_blank(
    field: &'static str,
    value: Option<String>,
) -> ValidationResult<String> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_owned())
}

/// Blank optional text is stored as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

pub(crate) fn coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> ValidationResult<Coordinate> {
    let latitude = latitude.ok_or(ValidationError::MissingField("lat"))?;
    let longitude = longitude.ok_or(ValidationError::MissingField("lng"))?;
    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return Err(ValidationError::InvalidCoordinate(coordinate));
    }
    Ok(coordinate)
}

pub(crate) fn moto_lots(lots: Option<u32>) -> ValidationResult<Option<u32>> {
    match lots {
        Some(given) if given > MAX_MOTO_LOTS => Err(ValidationError::TooManyLots {
            max: MAX_MOTO_LOTS,
            given,
        }),
        lots => Ok(lots),
    }
}
