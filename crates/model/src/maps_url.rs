//! Extracts coordinates from pasted Google Maps links or plain `lat,lng`
//! text.

use std::sync::LazyLock;

use regex::Regex;
use utility::geo::Coordinate;

use crate::region::is_in_singapore;

/// Tried in order, the first match inside Singapore wins.
static PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        // /maps/place/.../@1.3489,103.7495,17z
        r"@(-?\d+\.\d+),(-?\d+\.\d+)",
        r"[?&]q=(-?\d+\.\d+),(-?\d+\.\d+)",
        r"[?&]ll=(-?\d+\.\d+),(-?\d+\.\d+)",
        // data=...!3d1.3489!4d103.7495
        r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)",
        r"^(-?\d+\.\d+),\s*(-?\d+\.\d+)$",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
});

pub fn parse_location(text: &str) -> Option<Coordinate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    PATTERNS.iter().find_map(|pattern| {
        let captures = pattern.captures(text)?;
        let latitude = captures.get(1)?.as_str().parse().ok()?;
        let longitude = captures.get(2)?.as_str().parse().ok()?;
        Some(Coordinate::new(latitude, longitude)).filter(is_in_singapore)
    })
}

pub fn google_maps_url(coordinate: &Coordinate) -> String {
    format!(
        "https://www.google.com/maps?q={},{}",
        coordinate.latitude, coordinate.longitude
    )
}
