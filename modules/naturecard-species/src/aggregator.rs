use anyhow::Result;
use tracing::{info, warn};

use naturecard_common::{NatureCardError, ObservationPoint, SpeciesRecord, TaxonId};

use crate::backfill::backfill;
use crate::geo::SearchArea;
use crate::merge::merge;
use crate::observations::{self, ObservationCache};
use crate::primary::fetch_primary;
use crate::secondary::{fetch_facets, resolve_details};
use crate::traits::{PrimarySource, SecondarySource};

/// Tuning knobs for one aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Peak concurrent per-species lookups (detail and backfill stages).
    pub concurrency: usize,
    /// Distinct species keys requested from the secondary facet search.
    pub facet_limit: u32,
    /// Species rows requested from the primary provider.
    pub primary_page_size: u32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            facet_limit: 100,
            primary_page_size: 50,
        }
    }
}

/// Stats from one aggregation, logged on completion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    pub primary_species: usize,
    pub secondary_species: usize,
    pub merged_species: usize,
    pub primary_failed: bool,
    pub secondary_failed: bool,
}

/// Reconciles species lists from the primary and secondary providers.
pub struct SpeciesAggregator<P, S> {
    primary: P,
    secondary: S,
    config: AggregatorConfig,
}

impl<P: PrimarySource, S: SecondarySource> SpeciesAggregator<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary,
            config: AggregatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = AggregatorConfig {
            concurrency: config.concurrency.max(1),
            ..config
        };
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Ranked, deduplicated species observed in `area` during `month` (1-12).
    ///
    /// Fails only when neither provider's top-level query succeeded. A
    /// provider that answers with zero species is a success.
    pub async fn aggregate(
        &self,
        area: &SearchArea,
        month: u32,
    ) -> Result<Vec<SpeciesRecord>, NatureCardError> {
        self.aggregate_with_stats(area, month).await.map(|(records, _)| records)
    }

    pub async fn aggregate_with_stats(
        &self,
        area: &SearchArea,
        month: u32,
    ) -> Result<(Vec<SpeciesRecord>, AggregateStats), NatureCardError> {
        if !(1..=12).contains(&month) {
            return Err(NatureCardError::InvalidQuery(format!("month must be 1-12, got {month}")));
        }

        let bbox = area.bounding_box();
        let mut stats = AggregateStats::default();

        info!(
            lat = area.lat,
            lng = area.lng,
            radius_km = area.radius_km,
            month,
            "Aggregating species"
        );

        let (primary_result, facets_result) = tokio::join!(
            fetch_primary(&self.primary, area, month, self.config.primary_page_size),
            fetch_facets(&self.secondary, &bbox, month, self.config.facet_limit),
        );

        let primary_records = match primary_result {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Primary species query failed, continuing without it");
                stats.primary_failed = true;
                Vec::new()
            }
        };

        let facets = match facets_result {
            Ok(facets) => facets,
            Err(e) => {
                warn!(error = %e, "Secondary facet query failed, continuing without it");
                stats.secondary_failed = true;
                Vec::new()
            }
        };

        if stats.primary_failed && stats.secondary_failed {
            return Err(NatureCardError::ProvidersUnavailable);
        }

        let secondary_records =
            resolve_details(&self.secondary, facets, self.config.concurrency).await;

        let secondary_records = backfill(
            &self.primary,
            &self.secondary,
            &primary_records,
            secondary_records,
            &bbox,
            self.config.concurrency,
        )
        .await;

        stats.primary_species = primary_records.len();
        stats.secondary_species = secondary_records.len();

        let merged = merge(primary_records, secondary_records);
        stats.merged_species = merged.len();

        info!(
            primary = stats.primary_species,
            secondary = stats.secondary_species,
            merged = stats.merged_species,
            "Species aggregation complete"
        );

        Ok((merged, stats))
    }

    /// Plain-text summary for a card. `None` for secondary-provider taxa.
    pub async fn taxon_summary(&self, taxon_id: &TaxonId) -> Result<Option<String>> {
        observations::taxon_summary(&self.primary, taxon_id).await
    }

    /// Located observations near a point. Empty for secondary-provider taxa.
    pub async fn observations(
        &self,
        taxon_id: &TaxonId,
        lat: f64,
        lng: f64,
    ) -> Result<Vec<ObservationPoint>> {
        observations::fetch_observations(&self.primary, taxon_id, lat, lng).await
    }

    /// Same as [`Self::observations`], served from `cache` when possible.
    pub async fn observations_cached(
        &self,
        cache: &mut ObservationCache,
        taxon_id: &TaxonId,
    ) -> Result<Vec<ObservationPoint>> {
        cache.get_or_fetch(&self.primary, taxon_id).await
    }
}
