pub mod error;
pub mod types;

pub use error::{INatError, Result};
pub use types::{
    Observation, ObservationsQuery, Photo, QualityGrade, ResultsPage, SpeciesCount,
    SpeciesCountsQuery, Taxon,
};

use std::time::Duration;

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.inaturalist.org/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct INatClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for INatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl INatClient {
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

    /// Per-request timeout. Elapsed requests surface as `INatError::Network`.
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
            return Err(INatError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Species observed within a radius, with per-species observation counts.
    pub async fn species_counts(&self, query: &SpeciesCountsQuery) -> Result<Vec<SpeciesCount>> {
        let page: ResultsPage<SpeciesCount> = self
            .get("/observations/species_counts", &query.params())
            .await?;
        tracing::debug!(
            count = page.results.len(),
            total = ?page.total_results,
            "Fetched iNaturalist species counts"
        );
        Ok(page.results)
    }

    /// Fuzzy taxon name search. Results are ranked best match first.
    pub async fn autocomplete(&self, q: &str, per_page: u32) -> Result<Vec<Taxon>> {
        let params = [("q", q.to_string()), ("per_page", per_page.to_string())];
        let page: ResultsPage<Taxon> = self.get("/taxa/autocomplete", &params).await?;
        Ok(page.results)
    }

    /// Full taxon record, including the Wikipedia summary.
    pub async fn taxon(&self, id: u64) -> Result<Option<Taxon>> {
        let page: ResultsPage<Taxon> = self.get(&format!("/taxa/{id}"), &[]).await?;
        Ok(page.results.into_iter().next())
    }

    /// Individual observations of one taxon around a point.
    pub async fn observations(&self, query: &ObservationsQuery) -> Result<Vec<Observation>> {
        let page: ResultsPage<Observation> = self.get("/observations", &query.params()).await?;
        Ok(page.results)
    }
}
