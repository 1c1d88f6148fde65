use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_METERS: f64 = EARTH_RADIUS_KM * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("coordinate is not a finite number")]
    NotFinite,
    #[error("latitude {0} is outside of [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside of [-180, 180]")]
    Longitude(f64),
}

/// A point on the earth's surface in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without checking its range. Use `validated` or
    /// `validate` before feeding untrusted input into distance calculations.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(ValidationError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::Latitude(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::Longitude(self.longitude));
        }
        Ok(())
    }

    /// Moves the coordinate by the given deltas. Latitude is clamped to the
    /// poles, longitude wraps around the antimeridian.
    pub fn offset(&self, latitude_delta: f64, longitude_delta: f64) -> Self {
        let latitude = (self.latitude + latitude_delta).clamp(-90.0, 90.0);
        let mut longitude = self.longitude + longitude_delta;
        if longitude > 180.0 {
            longitude -= 360.0;
        } else if longitude < -180.0 {
            longitude += 360.0;
        }
        Self::new(latitude, longitude)
    }
}

/// Great-circle distance between two coordinates in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> Result<f64, ValidationError> {
    a.validate()?;
    b.validate()?;
    Ok(haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude) * 1000.0)
}

/// Haversine distance in kilometers. Does not validate its input.
pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = latitude_1.to_radians();
    let lat2_rad = latitude_2.to_radians();

    let dlat = lat2_rad - lat1_rad;
    let dlon = (longitude_2 - longitude_1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAN_FRANCISCO: Coordinate = Coordinate::new(37.7749, -122.4194);
    const LOS_ANGELES: Coordinate = Coordinate::new(34.0522, -118.2437);

    #[test]
    fn distance_is_symmetric() {
        let there = distance_meters(SAN_FRANCISCO, LOS_ANGELES).unwrap();
        let back = distance_meters(LOS_ANGELES, SAN_FRANCISCO).unwrap();
        assert!((there - back).abs() < 1e-6);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_meters(SAN_FRANCISCO, SAN_FRANCISCO).unwrap(), 0.0);
    }

    #[test]
    fn known_city_distance() {
        // roughly 559 km between both city centers
        let distance = distance_meters(SAN_FRANCISCO, LOS_ANGELES).unwrap();
        assert!((distance - 559_000.0).abs() < 2_000.0, "{distance}");
    }

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        let distance =
            distance_meters(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)).unwrap();
        let expected = EARTH_RADIUS_METERS * 1f64.to_radians();
        assert!((distance - expected).abs() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range_input() {
        let bad_latitude = Coordinate::new(91.0, 0.0);
        let bad_longitude = Coordinate::new(0.0, -180.5);
        assert_eq!(
            distance_meters(bad_latitude, SAN_FRANCISCO),
            Err(ValidationError::Latitude(91.0))
        );
        assert_eq!(
            distance_meters(SAN_FRANCISCO, bad_longitude),
            Err(ValidationError::Longitude(-180.5))
        );
        assert_eq!(
            Coordinate::validated(f64::NAN, 0.0),
            Err(ValidationError::NotFinite)
        );
    }

    #[test]
    fn offset_stays_in_range() {
        let north = Coordinate::new(89.9995, 0.0).offset(0.001, 0.0);
        assert_eq!(north.latitude, 90.0);

        let east = Coordinate::new(0.0, 179.9995).offset(0.0, 0.001);
        assert!(east.validate().is_ok());
        assert!(east.longitude < -179.0);
    }
}
