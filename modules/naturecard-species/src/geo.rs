use gbif_client::GeoBounds;
use naturecard_common::NatureCardError;
use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude in the equirectangular approximation.
const KM_PER_DEGREE: f64 = 111.0;

/// Latitudes are clamped to this before computing the longitude span so the
/// box stays finite near the poles.
const MAX_ABS_LAT: f64 = 89.9;

/// A circular search area: center point plus radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

impl SearchArea {
    pub fn new(lat: f64, lng: f64, radius_km: f64) -> Result<Self, NatureCardError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(NatureCardError::InvalidQuery(format!("latitude out of range: {lat}")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(NatureCardError::InvalidQuery(format!("longitude out of range: {lng}")));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(NatureCardError::InvalidQuery(format!("radius must be positive: {radius_km}")));
        }
        Ok(Self { lat, lng, radius_km })
    }

    /// Equivalent bounding box for providers that cannot query by radius.
    pub fn bounding_box(&self) -> BoundingBox {
        let lat_delta = self.radius_km / KM_PER_DEGREE;
        let clamped_lat = self.lat.clamp(-MAX_ABS_LAT, MAX_ABS_LAT);
        let lng_delta = self.radius_km / (KM_PER_DEGREE * clamped_lat.to_radians().cos());

        BoundingBox {
            min_lat: (self.lat - lat_delta).max(-90.0),
            max_lat: (self.lat + lat_delta).min(90.0),
            min_lng: (self.lng - lng_delta).max(-180.0),
            max_lng: (self.lng + lng_delta).min(180.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl From<BoundingBox> for GeoBounds {
    fn from(b: BoundingBox) -> Self {
        GeoBounds {
            min_lat: b.min_lat,
            max_lat: b.max_lat,
            min_lng: b.min_lng,
            max_lng: b.max_lng,
        }
    }
}
