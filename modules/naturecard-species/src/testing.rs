// Test mocks for the aggregation engine.
//
// Two mocks matching the two provider seams:
// - MockPrimary (PrimarySource): canned species counts plus name/id maps
// - MockSecondary (SecondarySource): canned facets plus key maps
//
// Both record every call so tests can assert which lookups happened.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use gbif_client::{Species, SpeciesFacet};
use inaturalist_client::{Observation, Photo, SpeciesCount, Taxon};

use crate::geo::{BoundingBox, SearchArea};
use crate::traits::{PrimarySource, SecondarySource};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// Golden Gate Park, San Francisco.
pub const GOLDEN_GATE_PARK: (f64, f64) = (37.7694, -122.4862);

pub fn park_area() -> SearchArea {
    SearchArea {
        lat: GOLDEN_GATE_PARK.0,
        lng: GOLDEN_GATE_PARK.1,
        radius_km: 5.0,
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn inat_taxon(id: u64, scientific: &str, common: Option<&str>, photo: Option<&str>) -> Taxon {
    Taxon {
        id,
        name: scientific.to_string(),
        preferred_common_name: common.map(str::to_string),
        iconic_taxon_name: Some("Aves".to_string()),
        default_photo: photo.map(|url| Photo {
            url: None,
            medium_url: Some(url.to_string()),
        }),
        wikipedia_summary: None,
    }
}

pub fn species_count(count: u64, taxon: Taxon) -> SpeciesCount {
    SpeciesCount {
        count,
        taxon: Some(taxon),
    }
}

pub fn gbif_species(canonical: &str, vernacular: Option<&str>, class: &str) -> Species {
    Species {
        key: None,
        scientific_name: Some(format!("{canonical} Linnaeus, 1758")),
        canonical_name: Some(canonical.to_string()),
        vernacular_name: vernacular.map(str::to_string),
        kingdom: Some("Animalia".to_string()),
        phylum: Some("Chordata".to_string()),
        class: Some(class.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Overlap tracking
// ---------------------------------------------------------------------------

/// Counts calls that are running at the same time and keeps the highest count.
#[derive(Default)]
struct InFlight {
    now: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    /// Occupy a slot for a couple of milliseconds so concurrent callers overlap.
    async fn hold(&self) {
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.now.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// MockPrimary
// ---------------------------------------------------------------------------

/// Canned primary provider. `species_counts` fails unless `.on_species_counts()`
/// was called; `taxon` and `observations` fail for unregistered ids;
/// `autocomplete` returns no match for unregistered names.
#[derive(Default)]
pub struct MockPrimary {
    species_counts: Option<Vec<SpeciesCount>>,
    autocomplete: HashMap<String, Taxon>,
    failing_autocomplete: Vec<String>,
    taxa: HashMap<u64, Taxon>,
    observations: HashMap<u64, Vec<Observation>>,
    calls: Mutex<Vec<String>>,
    autocomplete_in_flight: InFlight,
}

impl MockPrimary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_species_counts(mut self, rows: Vec<SpeciesCount>) -> Self {
        self.species_counts = Some(rows);
        self
    }

    pub fn on_autocomplete(mut self, scientific_name: &str, taxon: Taxon) -> Self {
        self.autocomplete.insert(scientific_name.to_string(), taxon);
        self
    }

    pub fn failing_autocomplete(mut self, scientific_name: &str) -> Self {
        self.failing_autocomplete.push(scientific_name.to_string());
        self
    }

    pub fn on_taxon(mut self, taxon: Taxon) -> Self {
        self.taxa.insert(taxon.id, taxon);
        self
    }

    pub fn on_observations(mut self, taxon_id: u64, observations: Vec<Observation>) -> Self {
        self.observations.insert(taxon_id, observations);
        self
    }

    /// Every call made so far, as `"method:argument"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Highest number of fuzzy name lookups observed running at once.
    pub fn peak_autocomplete_concurrency(&self) -> usize {
        self.autocomplete_in_flight.peak()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl PrimarySource for MockPrimary {
    async fn species_counts(
        &self,
        _area: &SearchArea,
        month: u32,
        _per_page: u32,
    ) -> Result<Vec<SpeciesCount>> {
        self.record(format!("species_counts:{month}"));
        self.species_counts
            .clone()
            .ok_or_else(|| anyhow!("MockPrimary: species counts unavailable"))
    }

    async fn autocomplete(&self, scientific_name: &str) -> Result<Option<Taxon>> {
        self.record(format!("autocomplete:{scientific_name}"));
        self.autocomplete_in_flight.hold().await;
        if self.failing_autocomplete.iter().any(|n| n == scientific_name) {
            bail!("MockPrimary: autocomplete failed for {scientific_name}");
        }
        Ok(self.autocomplete.get(scientific_name).cloned())
    }

    async fn taxon(&self, id: u64) -> Result<Option<Taxon>> {
        self.record(format!("taxon:{id}"));
        match self.taxa.get(&id) {
            Some(taxon) => Ok(Some(taxon.clone())),
            None => bail!("MockPrimary: no taxon registered for {id}"),
        }
    }

    async fn observations(
        &self,
        taxon_id: u64,
        _lat: f64,
        _lng: f64,
        _radius_km: f64,
    ) -> Result<Vec<Observation>> {
        self.record(format!("observations:{taxon_id}"));
        match self.observations.get(&taxon_id) {
            Some(obs) => Ok(obs.clone()),
            None => bail!("MockPrimary: no observations registered for {taxon_id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSecondary
// ---------------------------------------------------------------------------

/// Canned secondary provider. `species_facets` fails unless `.on_facets()` was
/// called; `species_detail` fails for unregistered keys; `occurrence_photo`
/// returns no photo for unregistered keys.
#[derive(Default)]
pub struct MockSecondary {
    facets: Option<Vec<SpeciesFacet>>,
    details: HashMap<u64, Species>,
    photos: HashMap<u64, String>,
    failing_photos: Vec<u64>,
    calls: Mutex<Vec<String>>,
    detail_in_flight: InFlight,
    photo_in_flight: InFlight,
}

impl MockSecondary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_facets(mut self, facets: Vec<(u64, u64)>) -> Self {
        self.facets = Some(
            facets
                .into_iter()
                .map(|(species_key, count)| SpeciesFacet { species_key, count })
                .collect(),
        );
        self
    }

    pub fn on_species(mut self, key: u64, species: Species) -> Self {
        self.details.insert(key, species);
        self
    }

    pub fn on_photo(mut self, key: u64, url: &str) -> Self {
        self.photos.insert(key, url.to_string());
        self
    }

    pub fn failing_photo(mut self, key: u64) -> Self {
        self.failing_photos.push(key);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Highest number of detail lookups observed running at once.
    pub fn peak_detail_concurrency(&self) -> usize {
        self.detail_in_flight.peak()
    }

    /// Highest number of media searches observed running at once.
    pub fn peak_photo_concurrency(&self) -> usize {
        self.photo_in_flight.peak()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl SecondarySource for MockSecondary {
    async fn species_facets(
        &self,
        _bbox: &BoundingBox,
        month: u32,
        limit: u32,
    ) -> Result<Vec<SpeciesFacet>> {
        self.record(format!("species_facets:{month}"));
        let facets = self
            .facets
            .clone()
            .ok_or_else(|| anyhow!("MockSecondary: facet search unavailable"))?;
        Ok(facets.into_iter().take(limit as usize).collect())
    }

    async fn species_detail(&self, key: u64) -> Result<Species> {
        self.record(format!("species_detail:{key}"));
        self.detail_in_flight.hold().await;

        match self.details.get(&key) {
            Some(species) => Ok(species.clone()),
            None => bail!("MockSecondary: no species registered for {key}"),
        }
    }

    async fn occurrence_photo(&self, key: u64, _bbox: &BoundingBox) -> Result<Option<String>> {
        self.record(format!("occurrence_photo:{key}"));
        self.photo_in_flight.hold().await;
        if self.failing_photos.contains(&key) {
            bail!("MockSecondary: media search failed for {key}");
        }
        Ok(self.photos.get(&key).cloned())
    }
}
