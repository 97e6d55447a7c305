//! Argument checks shared by the API builders.

use crate::core::MapsError;

pub(crate) const MAX_WAYPOINTS: usize = 25;
pub(crate) const MAX_MATRIX_ORIGINS: usize = 50;
pub(crate) const MAX_MATRIX_DESTINATIONS: usize = 50;
pub(crate) const MAX_ROADS_POINTS: usize = 100;

pub(crate) fn coordinate(latitude: f64, longitude: f64) -> Result<(), MapsError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(MapsError::InvalidArgument(format!(
            "latitude must be between -90 and 90, got {latitude}"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(MapsError::InvalidArgument(format!(
            "longitude must be between -180 and 180, got {longitude}"
        )));
    }
    Ok(())
}

pub(crate) fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, MapsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MapsError::InvalidArgument(format!(
            "{field} cannot be empty or whitespace-only"
        )));
    }
    Ok(trimmed)
}

pub(crate) fn at_most<T>(items: &[T], max: usize, field: &str) -> Result<(), MapsError> {
    if items.len() > max {
        return Err(MapsError::InvalidArgument(format!(
            "maximum {max} {field} allowed, got {}",
            items.len()
        )));
    }
    Ok(())
}

/// Non-empty, bounded list of `(lat, lng)` pairs rendered as `lat,lng|lat,lng`.
pub(crate) fn point_list(points: &[(f64, f64)], field: &str) -> Result<String, MapsError> {
    if points.is_empty() {
        return Err(MapsError::InvalidArgument(format!("{field} cannot be empty")));
    }
    at_most(points, MAX_ROADS_POINTS, field)?;
    for (i, &(lat, lng)) in points.iter().enumerate() {
        coordinate(lat, lng).map_err(|e| {
            MapsError::InvalidArgument(format!("invalid coordinate at index {i} of {field}: {e}"))
        })?;
    }
    Ok(points
        .iter()
        .map(|(lat, lng)| format!("{lat},{lng}"))
        .collect::<Vec<_>>()
        .join("|"))
}
