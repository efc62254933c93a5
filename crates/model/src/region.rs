use utility::geo::{BoundingBox, Coordinate};

/// Rough extent of Singapore. Used as a sanity check on submitted
/// coordinates, not as a geodetic boundary.
pub const SINGAPORE: BoundingBox = BoundingBox::new(1.1, 1.5, 103.6, 104.1);

pub fn is_in_singapore(coordinate: &Coordinate) -> bool {
    coordinate.is_finite() && SINGAPORE.contains(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marina_bay_is_in_singapore() {
        assert!(is_in_singapore(&Coordinate::new(1.2834, 103.8607)));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(is_in_singapore(&Coordinate::new(1.1, 103.6)));
        assert!(is_in_singapore(&Coordinate::new(1.5, 104.1)));
    }

    #[test]
    fn johor_bahru_and_nan_are_not() {
        assert!(!is_in_singapore(&Coordinate::new(1.4927, 104.1300)));
        assert!(!is_in_singapore(&Coordinate::new(f64::NAN, 103.8)));
    }
}
