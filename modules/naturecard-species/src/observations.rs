use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use naturecard_common::{ObservationPoint, TaxonId};

use crate::geo::SearchArea;
use crate::traits::PrimarySource;

/// Observation maps look this far around the card location.
pub const OBSERVATION_RADIUS_KM: f64 = 3.0;

static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Plain-text Wikipedia summary for a primary-provider taxon.
///
/// Secondary ids live in a different namespace and resolve to `None`
/// without touching the network.
pub async fn taxon_summary<P: PrimarySource + ?Sized>(
    source: &P,
    taxon_id: &TaxonId,
) -> Result<Option<String>> {
    let Some(id) = taxon_id.primary() else {
        debug!(taxon = %taxon_id, "Skipping summary lookup for non-primary taxon");
        return Ok(None);
    };

    let summary = source
        .taxon(id)
        .await?
        .and_then(|t| t.wikipedia_summary)
        .map(|s| strip_html_tags(&s))
        .filter(|s| !s.is_empty());
    Ok(summary)
}

/// Located observations of a taxon near a point. Empty for non-primary taxa.
pub async fn fetch_observations<P: PrimarySource + ?Sized>(
    source: &P,
    taxon_id: &TaxonId,
    lat: f64,
    lng: f64,
) -> Result<Vec<ObservationPoint>> {
    let Some(id) = taxon_id.primary() else {
        debug!(taxon = %taxon_id, "Skipping observation lookup for non-primary taxon");
        return Ok(Vec::new());
    };

    let points = source
        .observations(id, lat, lng, OBSERVATION_RADIUS_KM)
        .await?
        .into_iter()
        .filter_map(|obs| {
            let (lat, lng) = obs.coordinates()?;
            Some(ObservationPoint { id: obs.id, lat, lng })
        })
        .collect();
    Ok(points)
}

pub fn strip_html_tags(html: &str) -> String {
    RE_HTML_TAG.replace_all(html, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// ObservationCache
// ---------------------------------------------------------------------------

/// Observation lookups for one selected search area.
///
/// Owned by whoever drives the selection; entries are dropped as soon as the
/// area changes.
#[derive(Debug, Default)]
pub struct ObservationCache {
    area: Option<SearchArea>,
    entries: HashMap<TaxonId, Vec<ObservationPoint>>,
}

impl ObservationCache {
    pub fn new(area: SearchArea) -> Self {
        Self {
            area: Some(area),
            entries: HashMap::new(),
        }
    }

    pub fn area(&self) -> Option<&SearchArea> {
        self.area.as_ref()
    }

    /// Point the cache at `area`, clearing it if the area changed.
    pub fn rebind(&mut self, area: SearchArea) {
        if self.area.as_ref() != Some(&area) {
            self.entries.clear();
            self.area = Some(area);
        }
    }

    pub fn get(&self, taxon_id: &TaxonId) -> Option<&[ObservationPoint]> {
        self.entries.get(taxon_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached observations for `taxon_id` around the bound area's center,
    /// fetching on a miss. Failed fetches are not cached.
    pub async fn get_or_fetch<P: PrimarySource + ?Sized>(
        &mut self,
        source: &P,
        taxon_id: &TaxonId,
    ) -> Result<Vec<ObservationPoint>> {
        if let Some(hit) = self.entries.get(taxon_id) {
            return Ok(hit.clone());
        }
        let Some(area) = self.area else {
            return Ok(Vec::new());
        };

        let points = fetch_observations(source, taxon_id, area.lat, area.lng).await?;
        self.entries.insert(*taxon_id, points.clone());
        Ok(points)
    }
}
