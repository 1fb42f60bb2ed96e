use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Paged envelope shared by every v1 list endpoint.
///
/// Rows that fail to parse are skipped one at a time; the rest of the page survives.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ResultsPage<T> {
    #[serde(default = "Vec::new", deserialize_with = "skip_malformed_rows")]
    pub results: Vec<T>,
    pub total_results: Option<u64>,
}

fn skip_malformed_rows<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed iNaturalist row");
                None
            }
        })
        .collect())
}

// --- Taxa ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Photo {
    pub url: Option<String>,
    pub medium_url: Option<String>,
}

impl Photo {
    /// Medium-size rendition if present, else the square thumbnail URL.
    pub fn best_url(&self) -> Option<&str> {
        self.medium_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.url.as_deref().filter(|u| !u.is_empty()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Taxon {
    pub id: u64,
    /// Scientific name.
    pub name: String,
    pub preferred_common_name: Option<String>,
    pub iconic_taxon_name: Option<String>,
    pub default_photo: Option<Photo>,
    pub wikipedia_summary: Option<String>,
}

impl Taxon {
    pub fn photo_url(&self) -> Option<&str> {
        self.default_photo.as_ref().and_then(Photo::best_url)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.preferred_common_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
    }
}

/// One row of `/observations/species_counts`.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesCount {
    pub count: u64,
    pub taxon: Option<Taxon>,
}

// --- Observations ---

#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    pub id: u64,
    /// `"lat,lng"` string; absent for obscured or unlocated observations.
    pub location: Option<String>,
}

impl Observation {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.location.as_deref()?.split_once(',')?;
        Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }
}

// --- Queries ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityGrade {
    Research,
    NeedsId,
    Casual,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Research => "research",
            QualityGrade::NeedsId => "needs_id",
            QualityGrade::Casual => "casual",
        }
    }
}

/// Parameters for `/observations/species_counts`.
#[derive(Debug, Clone)]
pub struct SpeciesCountsQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub month: u32,
    pub quality_grade: QualityGrade,
    pub per_page: u32,
}

impl SpeciesCountsQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.lat.to_string()),
            ("lng", self.lng.to_string()),
            ("radius", self.radius_km.to_string()),
            ("quality_grade", self.quality_grade.as_str().to_string()),
            ("month", self.month.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Parameters for `/observations` scoped to one taxon around a point.
#[derive(Debug, Clone)]
pub struct ObservationsQuery {
    pub taxon_id: u64,
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub per_page: u32,
}

impl ObservationsQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("taxon_id", self.taxon_id.to_string()),
            ("lat", self.lat.to_string()),
            ("lng", self.lng.to_string()),
            ("radius", self.radius_km.to_string()),
            ("per_page", self.per_page.to_string()),
            ("order_by", "observed_on".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_prefers_medium_rendition() {
        let photo = Photo {
            url: Some("https://static.inaturalist.org/photos/1/square.jpg".into()),
            medium_url: Some("https://static.inaturalist.org/photos/1/medium.jpg".into()),
        };
        assert_eq!(
            photo.best_url(),
            Some("https://static.inaturalist.org/photos/1/medium.jpg")
        );

        let square_only = Photo {
            url: Some("square.jpg".into()),
            medium_url: Some(String::new()),
        };
        assert_eq!(square_only.best_url(), Some("square.jpg"));
        assert_eq!(Photo::default().best_url(), None);
    }

    #[test]
    fn observation_location_parses_lat_lng() {
        let obs = Observation {
            id: 7,
            location: Some("37.7749,-122.4194".into()),
        };
        assert_eq!(obs.coordinates(), Some((37.7749, -122.4194)));

        let garbled = Observation {
            id: 8,
            location: Some("nowhere".into()),
        };
        assert_eq!(garbled.coordinates(), None);

        let missing = Observation { id: 9, location: None };
        assert_eq!(missing.coordinates(), None);
    }

    #[test]
    fn blank_common_name_is_absent() {
        let taxon = Taxon {
            preferred_common_name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(taxon.common_name(), None);
    }

    #[test]
    fn nameless_taxon_drops_only_its_row() {
        let page: ResultsPage<SpeciesCount> = serde_json::from_value(serde_json::json!({
            "total_results": 2,
            "results": [
                {
                    "count": 12,
                    "taxon": {
                        "id": 4956,
                        "name": "Ardea herodias",
                        "default_photo": { "medium_url": "https://example.org/heron.jpg" }
                    }
                },
                { "count": 3, "taxon": { "id": 7, "name": null } },
                { "count": "many" }
            ]
        }))
        .unwrap();

        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].count, 12);
        assert_eq!(page.results[0].taxon.as_ref().unwrap().id, 4956);
    }

    #[test]
    fn null_results_is_empty() {
        let page: ResultsPage<Taxon> =
            serde_json::from_str(r#"{"total_results": 0, "results": null}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn species_counts_page_tolerates_missing_results() {
        let page: ResultsPage<SpeciesCount> =
            serde_json::from_str(r#"{"total_results": 0}"#).unwrap();
        assert!(page.results.is_empty());
    }
}
