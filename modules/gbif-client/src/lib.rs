pub mod error;
pub mod types;

pub use error::{GbifError, Result};
pub use types::{
    Facet, FacetCount, GeoBounds, Media, Occurrence, OccurrenceSearchResponse, Species,
    SpeciesFacet,
};

use std::time::Duration;

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.gbif.org/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct GbifClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for GbifClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GbifClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout. Elapsed requests surface as `GbifError::Network`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GbifError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Distinct species keys with occurrence counts inside `bounds` for a month.
    /// Only georeferenced occurrences without geospatial issues are counted.
    pub async fn species_facets(
        &self,
        bounds: &GeoBounds,
        month: u32,
        facet_limit: u32,
    ) -> Result<Vec<SpeciesFacet>> {
        let mut params: Vec<(&str, String)> = bounds.params().to_vec();
        params.extend([
            ("limit", "0".to_string()),
            ("facet", "speciesKey".to_string()),
            ("facetLimit", facet_limit.to_string()),
            ("hasCoordinate", "true".to_string()),
            ("hasGeospatialIssue", "false".to_string()),
            ("month", month.to_string()),
        ]);

        let resp: OccurrenceSearchResponse = self.get("/occurrence/search", &params).await?;
        let facets = resp.species_facets();
        tracing::debug!(count = facets.len(), "Fetched GBIF species facets");
        Ok(facets)
    }

    /// Name and classification for one species key.
    pub async fn species(&self, key: u64) -> Result<Species> {
        self.get(&format!("/species/{key}"), &[]).await
    }

    /// URL of one still image of the species recorded inside `bounds`, if any.
    pub async fn occurrence_photo(&self, species_key: u64, bounds: &GeoBounds) -> Result<Option<String>> {
        let mut params: Vec<(&str, String)> = vec![("speciesKey", species_key.to_string())];
        params.extend(bounds.params());
        params.extend([
            ("mediaType", "StillImage".to_string()),
            ("limit", "1".to_string()),
        ]);

        let resp: OccurrenceSearchResponse = self.get("/occurrence/search", &params).await?;
        Ok(resp.first_media_identifier().map(str::to_string))
    }
}
