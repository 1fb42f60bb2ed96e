use anyhow::Result;
use tracing::{debug, warn};

use gbif_client::{Species, SpeciesFacet};
use naturecard_common::{Provenance, SpeciesRecord, TaxonId};

use crate::batch::for_each_bounded;
use crate::geo::BoundingBox;
use crate::taxonomy::map_category;
use crate::traits::SecondarySource;

/// Stage one: candidate species keys with occurrence counts.
pub async fn fetch_facets<S: SecondarySource + ?Sized>(
    source: &S,
    bbox: &BoundingBox,
    month: u32,
    facet_limit: u32,
) -> Result<Vec<SpeciesFacet>> {
    source.species_facets(bbox, month, facet_limit).await
}

/// Stage two: resolve each facet to a species record, `concurrency` lookups at a time.
///
/// Failed lookups and nameless species are dropped individually.
pub async fn resolve_details<S: SecondarySource + ?Sized>(
    source: &S,
    facets: Vec<SpeciesFacet>,
    concurrency: usize,
) -> Vec<SpeciesRecord> {
    let requested = facets.len();
    let resolved = for_each_bounded(facets, concurrency, |facet| async move {
        match source.species_detail(facet.species_key).await {
            Ok(species) => normalize_species(facet, species),
            Err(e) => {
                warn!(species_key = facet.species_key, error = %e, "GBIF species lookup failed");
                None
            }
        }
    })
    .await;

    let records: Vec<SpeciesRecord> = resolved.into_iter().flatten().collect();
    debug!(requested, kept = records.len(), "Resolved secondary species");
    records
}

/// Both stages back to back.
pub async fn fetch_secondary<S: SecondarySource + ?Sized>(
    source: &S,
    bbox: &BoundingBox,
    month: u32,
    facet_limit: u32,
    concurrency: usize,
) -> Result<Vec<SpeciesRecord>> {
    let facets = fetch_facets(source, bbox, month, facet_limit).await?;
    Ok(resolve_details(source, facets, concurrency).await)
}

/// Convert a species detail. Returns `None` when neither canonical nor scientific name is set.
pub fn normalize_species(facet: SpeciesFacet, species: Species) -> Option<SpeciesRecord> {
    let scientific_name = non_blank(species.canonical_name.as_deref())
        .or_else(|| non_blank(species.scientific_name.as_deref()))?
        .to_string();

    let common_name = non_blank(species.vernacular_name.as_deref())
        .unwrap_or(&scientific_name)
        .to_string();

    let category = map_category(
        species.kingdom.as_deref(),
        species.phylum.as_deref(),
        species.class.as_deref(),
    );

    Some(SpeciesRecord {
        taxon_id: TaxonId::Secondary(facet.species_key),
        common_name,
        scientific_name,
        photo_url: None,
        category,
        observation_count: facet.count,
        provenance: Provenance::Secondary,
    })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}
