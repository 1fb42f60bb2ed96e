use std::collections::HashSet;

use tracing::{debug, warn};

use naturecard_common::SpeciesRecord;

use crate::batch::for_each_bounded;
use crate::geo::BoundingBox;
use crate::traits::{PrimarySource, SecondarySource};

/// Fill photos (and better common names) for species only the secondary provider reported.
///
/// Records whose scientific name also appears in `primary_records` pass through
/// untouched. Order of `secondary_records` is preserved.
pub async fn backfill<P, S>(
    primary: &P,
    secondary: &S,
    primary_records: &[SpeciesRecord],
    secondary_records: Vec<SpeciesRecord>,
    bbox: &BoundingBox,
    concurrency: usize,
) -> Vec<SpeciesRecord>
where
    P: PrimarySource + ?Sized,
    S: SecondarySource + ?Sized,
{
    let known: HashSet<String> = primary_records.iter().map(SpeciesRecord::merge_key).collect();
    let (shared, exclusive): (Vec<_>, Vec<_>) = secondary_records
        .into_iter()
        .enumerate()
        .partition(|(_, r)| known.contains(&r.merge_key()));

    debug!(exclusive = exclusive.len(), shared = shared.len(), "Backfilling secondary-only species");

    let filled = for_each_bounded(exclusive, concurrency, |(idx, record)| async move {
        (idx, backfill_one(primary, secondary, record, bbox).await)
    })
    .await;

    let mut all: Vec<(usize, SpeciesRecord)> = shared.into_iter().chain(filled).collect();
    all.sort_by_key(|(idx, _)| *idx);
    all.into_iter().map(|(_, r)| r).collect()
}

/// Media search first, then the primary provider's fuzzy name match.
///
/// A record that finds nothing keeps `photo_url = None`.
pub async fn backfill_one<P, S>(
    primary: &P,
    secondary: &S,
    mut record: SpeciesRecord,
    bbox: &BoundingBox,
) -> SpeciesRecord
where
    P: PrimarySource + ?Sized,
    S: SecondarySource + ?Sized,
{
    if let Some(key) = record.taxon_id.secondary() {
        match secondary.occurrence_photo(key, bbox).await {
            Ok(Some(url)) if !url.is_empty() => {
                record.photo_url = Some(url);
                return record;
            }
            Ok(_) => {}
            Err(e) => warn!(species_key = key, error = %e, "GBIF media lookup failed"),
        }
    }

    match primary.autocomplete(&record.scientific_name).await {
        Ok(Some(taxon)) => {
            record.photo_url = taxon.photo_url().map(str::to_string);
            if let Some(name) = taxon.common_name() {
                record.common_name = name.to_string();
            }
        }
        Ok(None) => {
            debug!(scientific_name = %record.scientific_name, "No fuzzy match on primary provider");
        }
        Err(e) => {
            warn!(scientific_name = %record.scientific_name, error = %e, "iNaturalist fallback lookup failed");
        }
    }

    record
}
