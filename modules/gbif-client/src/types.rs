use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Latitude/longitude range filter for occurrence search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub(crate) fn params(&self) -> [(&'static str, String); 2] {
        [
            ("decimalLatitude", format!("{},{}", self.min_lat, self.max_lat)),
            ("decimalLongitude", format!("{},{}", self.min_lng, self.max_lng)),
        ]
    }
}

// --- Occurrence search ---

/// Parse a list element by element, dropping entries that do not fit `T`.
fn skip_malformed<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed GBIF entry");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct OccurrenceSearchResponse {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub results: Vec<Occurrence>,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub facets: Vec<Facet>,
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Facet {
    /// Upper-snake field name, e.g. `SPECIES_KEY`.
    pub field: String,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub counts: Vec<FacetCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacetCount {
    /// Facet value rendered as a string; numeric for key facets.
    pub name: String,
    pub count: u64,
}

/// A species key with its occurrence count inside the searched area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesFacet {
    pub species_key: u64,
    pub count: u64,
}

impl OccurrenceSearchResponse {
    /// Extract the `SPECIES_KEY` facet. Values that are not numeric keys are skipped.
    pub fn species_facets(&self) -> Vec<SpeciesFacet> {
        self.facets
            .iter()
            .find(|f| f.field == "SPECIES_KEY")
            .map(|f| {
                f.counts
                    .iter()
                    .filter_map(|c| {
                        Some(SpeciesFacet {
                            species_key: c.name.parse().ok()?,
                            count: c.count,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Identifier of the first media item on the first result.
    pub fn first_media_identifier(&self) -> Option<&str> {
        self.results
            .first()?
            .media
            .first()?
            .identifier
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Occurrence {
    pub key: Option<u64>,
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    /// URL of the media resource.
    pub identifier: Option<String>,
}

// --- Species ---

/// A record from `/species/{key}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub key: Option<u64>,
    /// Full name including authorship, e.g. `Ardea herodias Linnaeus, 1758`.
    pub scientific_name: Option<String>,
    /// Name without authorship.
    pub canonical_name: Option<String>,
    pub vernacular_name: Option<String>,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
}
