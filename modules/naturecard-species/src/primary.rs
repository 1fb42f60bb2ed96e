use anyhow::Result;
use tracing::debug;

use inaturalist_client::SpeciesCount;
use naturecard_common::{Category, Provenance, SpeciesRecord, TaxonId};

use crate::geo::SearchArea;
use crate::traits::PrimarySource;

/// Species observed in the area according to the primary provider.
///
/// An `Err` means the provider could not be reached or answered badly; the
/// caller decides whether that degrades to an empty list.
pub async fn fetch_primary<P: PrimarySource + ?Sized>(
    source: &P,
    area: &SearchArea,
    month: u32,
    page_size: u32,
) -> Result<Vec<SpeciesRecord>> {
    let rows = source.species_counts(area, month, page_size).await?;
    let total = rows.len();
    let records: Vec<SpeciesRecord> = rows.into_iter().filter_map(normalize_species_count).collect();
    debug!(total, kept = records.len(), "Normalized primary species");
    Ok(records)
}

/// Convert one species-count row. Rows without a taxon or a usable photo are dropped.
pub fn normalize_species_count(row: SpeciesCount) -> Option<SpeciesRecord> {
    let taxon = row.taxon?;
    let photo_url = taxon.photo_url()?.to_string();
    let common_name = taxon.common_name().unwrap_or(&taxon.name).to_string();
    let category = taxon
        .iconic_taxon_name
        .as_deref()
        .map(Category::from_label)
        .unwrap_or(Category::Unknown);

    Some(SpeciesRecord {
        taxon_id: TaxonId::Primary(taxon.id),
        common_name,
        scientific_name: taxon.name,
        photo_url: Some(photo_url),
        category,
        observation_count: row.count,
        provenance: Provenance::Primary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inaturalist_client::{Photo, Taxon};

    fn row(count: u64, taxon: Option<Taxon>) -> SpeciesCount {
        SpeciesCount { count, taxon }
    }

    fn heron() -> Taxon {
        Taxon {
            id: 4956,
            name: "Ardea herodias".into(),
            preferred_common_name: Some("Great Blue Heron".into()),
            iconic_taxon_name: Some("Aves".into()),
            default_photo: Some(Photo {
                url: Some("square.jpg".into()),
                medium_url: Some("medium.jpg".into()),
            }),
            wikipedia_summary: None,
        }
    }

    #[test]
    fn normalizes_full_row() {
        let record = normalize_species_count(row(12, Some(heron()))).unwrap();
        assert_eq!(record.taxon_id, TaxonId::Primary(4956));
        assert_eq!(record.common_name, "Great Blue Heron");
        assert_eq!(record.scientific_name, "Ardea herodias");
        assert_eq!(record.photo_url.as_deref(), Some("medium.jpg"));
        assert_eq!(record.category, Category::Aves);
        assert_eq!(record.observation_count, 12);
        assert_eq!(record.provenance, Provenance::Primary);
    }

    #[test]
    fn drops_rows_without_photo() {
        let mut taxon = heron();
        taxon.default_photo = None;
        assert!(normalize_species_count(row(3, Some(taxon))).is_none());

        let mut blank = heron();
        blank.default_photo = Some(Photo::default());
        assert!(normalize_species_count(row(3, Some(blank))).is_none());

        assert!(normalize_species_count(row(3, None)).is_none());
    }

    #[test]
    fn common_name_falls_back_to_scientific() {
        let mut taxon = heron();
        taxon.preferred_common_name = None;
        let record = normalize_species_count(row(1, Some(taxon))).unwrap();
        assert_eq!(record.common_name, "Ardea herodias");
    }

    #[test]
    fn missing_iconic_taxon_is_unknown() {
        let mut taxon = heron();
        taxon.iconic_taxon_name = None;
        let record = normalize_species_count(row(1, Some(taxon))).unwrap();
        assert_eq!(record.category, Category::Unknown);
    }
}
