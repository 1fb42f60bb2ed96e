// Provider seams for the aggregation engine.
//
// PrimarySource fronts iNaturalist, SecondarySource fronts GBIF. Both return
// the provider's raw records so normalization stays in the engine and can be
// exercised against the mocks in `testing`.

use anyhow::Result;
use async_trait::async_trait;

use gbif_client::{GbifClient, GeoBounds, Species, SpeciesFacet};
use inaturalist_client::{
    INatClient, Observation, ObservationsQuery, QualityGrade, SpeciesCount, SpeciesCountsQuery,
    Taxon,
};

use crate::geo::{BoundingBox, SearchArea};

// ---------------------------------------------------------------------------
// PrimarySource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PrimarySource: Send + Sync {
    /// Research-grade species counts inside a radius for one month of the year.
    async fn species_counts(
        &self,
        area: &SearchArea,
        month: u32,
        per_page: u32,
    ) -> Result<Vec<SpeciesCount>>;

    /// Best fuzzy match for a scientific name.
    async fn autocomplete(&self, scientific_name: &str) -> Result<Option<Taxon>>;

    /// Full taxon record by primary-provider id.
    async fn taxon(&self, id: u64) -> Result<Option<Taxon>>;

    /// Individual observations of a taxon around a point.
    async fn observations(
        &self,
        taxon_id: u64,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> Result<Vec<Observation>>;
}

#[async_trait]
impl PrimarySource for INatClient {
    async fn species_counts(
        &self,
        area: &SearchArea,
        month: u32,
        per_page: u32,
    ) -> Result<Vec<SpeciesCount>> {
        let query = SpeciesCountsQuery {
            lat: area.lat,
            lng: area.lng,
            radius_km: area.radius_km,
            month,
            quality_grade: QualityGrade::Research,
            per_page,
        };
        Ok(INatClient::species_counts(self, &query).await?)
    }

    async fn autocomplete(&self, scientific_name: &str) -> Result<Option<Taxon>> {
        Ok(INatClient::autocomplete(self, scientific_name, 1)
            .await?
            .into_iter()
            .next())
    }

    async fn taxon(&self, id: u64) -> Result<Option<Taxon>> {
        Ok(INatClient::taxon(self, id).await?)
    }

    async fn observations(
        &self,
        taxon_id: u64,
        lat: f64,
        lng: f64,
        radius_km: f64,
    ) -> Result<Vec<Observation>> {
        let query = ObservationsQuery {
            taxon_id,
            lat,
            lng,
            radius_km,
            per_page: 50,
        };
        Ok(INatClient::observations(self, &query).await?)
    }
}

// ---------------------------------------------------------------------------
// SecondarySource
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SecondarySource: Send + Sync {
    /// Species keys with occurrence counts inside a bounding box for one month.
    async fn species_facets(
        &self,
        bbox: &BoundingBox,
        month: u32,
        limit: u32,
    ) -> Result<Vec<SpeciesFacet>>;

    /// Name and classification for a species key.
    async fn species_detail(&self, key: u64) -> Result<Species>;

    /// One still-image URL of the species recorded inside the box.
    async fn occurrence_photo(&self, key: u64, bbox: &BoundingBox) -> Result<Option<String>>;
}

#[async_trait]
impl SecondarySource for GbifClient {
    async fn species_facets(
        &self,
        bbox: &BoundingBox,
        month: u32,
        limit: u32,
    ) -> Result<Vec<SpeciesFacet>> {
        Ok(GbifClient::species_facets(self, &GeoBounds::from(*bbox), month, limit).await?)
    }

    async fn species_detail(&self, key: u64) -> Result<Species> {
        Ok(self.species(key).await?)
    }

    async fn occurrence_photo(&self, key: u64, bbox: &BoundingBox) -> Result<Option<String>> {
        Ok(GbifClient::occurrence_photo(self, key, &GeoBounds::from(*bbox)).await?)
    }
}
