//! End-to-end aggregation against mock providers. No network.

use inaturalist_client::Observation;
use naturecard_common::{Category, NatureCardError, Provenance, TaxonId};
use naturecard_species::testing::{
    gbif_species, inat_taxon, park_area, species_count, MockPrimary, MockSecondary,
};
use naturecard_species::{AggregatorConfig, ObservationCache, SearchArea, SpeciesAggregator};

const HERON_INAT: u64 = 4956;
const HERON_GBIF: u64 = 2481139;
const MALLARD_GBIF: u64 = 9761484;

fn heron_primary() -> MockPrimary {
    MockPrimary::new().on_species_counts(vec![species_count(
        12,
        inat_taxon(HERON_INAT, "Ardea herodias", Some("Great Blue Heron"), Some("x")),
    )])
}

fn heron_and_mallard_secondary() -> MockSecondary {
    MockSecondary::new()
        .on_facets(vec![(HERON_GBIF, 3), (MALLARD_GBIF, 7)])
        .on_species(HERON_GBIF, gbif_species("Ardea herodias", Some("Great Blue Heron"), "Aves"))
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard"), "Aves"))
}

// ---------------------------------------------------------------------------
// Merge semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn heron_and_mallard_merge_in_count_order() {
    let secondary = heron_and_mallard_secondary().on_photo(MALLARD_GBIF, "https://images.gbif.org/mallard.jpg");
    let aggregator = SpeciesAggregator::new(heron_primary(), secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();

    assert_eq!(species.len(), 2);

    let heron = &species[0];
    assert_eq!(heron.scientific_name, "Ardea herodias");
    assert_eq!(heron.observation_count, 15);
    assert_eq!(heron.common_name, "Great Blue Heron");
    assert_eq!(heron.photo_url.as_deref(), Some("x"));
    assert_eq!(heron.provenance, Provenance::Both);
    assert_eq!(heron.taxon_id, TaxonId::Primary(HERON_INAT));

    let mallard = &species[1];
    assert_eq!(mallard.scientific_name, "Anas platyrhynchos");
    assert_eq!(mallard.observation_count, 7);
    assert_eq!(mallard.provenance, Provenance::Secondary);
    assert_eq!(mallard.photo_url.as_deref(), Some("https://images.gbif.org/mallard.jpg"));
    assert_eq!(mallard.taxon_id, TaxonId::Secondary(MALLARD_GBIF));
    assert_eq!(mallard.category, Category::Aves);
}

#[tokio::test]
async fn species_in_both_lists_are_never_backfilled() {
    let secondary = heron_and_mallard_secondary();
    let primary = heron_primary();
    let aggregator = SpeciesAggregator::new(primary, secondary);

    aggregator.aggregate(&park_area(), 5).await.unwrap();

    let secondary_calls = aggregator.secondary().calls();
    assert!(!secondary_calls.contains(&format!("occurrence_photo:{HERON_GBIF}")));
    assert!(secondary_calls.contains(&format!("occurrence_photo:{MALLARD_GBIF}")));

    let primary_calls = aggregator.primary().calls();
    assert!(!primary_calls.contains(&"autocomplete:Ardea herodias".to_string()));
}

// ---------------------------------------------------------------------------
// Degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn primary_outage_still_returns_secondary_species() {
    let secondary = MockSecondary::new()
        .on_facets(vec![(MALLARD_GBIF, 7), (HERON_GBIF, 3)])
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard"), "Aves"))
        .on_species(HERON_GBIF, gbif_species("Ardea herodias", None, "Aves"));
    let aggregator = SpeciesAggregator::new(MockPrimary::new(), secondary);

    let (species, stats) = aggregator.aggregate_with_stats(&park_area(), 5).await.unwrap();

    assert!(stats.primary_failed);
    assert!(!stats.secondary_failed);
    assert_eq!(species.len(), 2);
    assert!(species.iter().all(|s| s.provenance == Provenance::Secondary));
    assert_eq!(species[0].scientific_name, "Anas platyrhynchos");
    // no vernacular name, and the fallback found nothing
    assert_eq!(species[1].common_name, "Ardea herodias");
    assert_eq!(species[1].photo_url, None);
}

#[tokio::test]
async fn secondary_outage_still_returns_primary_species() {
    let aggregator = SpeciesAggregator::new(heron_primary(), MockSecondary::new());

    let (species, stats) = aggregator.aggregate_with_stats(&park_area(), 5).await.unwrap();

    assert!(stats.secondary_failed);
    assert_eq!(species.len(), 1);
    assert_eq!(species[0].provenance, Provenance::Primary);
}

#[tokio::test]
async fn both_providers_down_is_an_error() {
    let aggregator = SpeciesAggregator::new(MockPrimary::new(), MockSecondary::new());

    let err = aggregator.aggregate(&park_area(), 5).await.unwrap_err();
    assert!(matches!(err, NatureCardError::ProvidersUnavailable));
}

#[tokio::test]
async fn empty_answers_are_an_empty_success() {
    let aggregator = SpeciesAggregator::new(
        MockPrimary::new().on_species_counts(vec![]),
        MockSecondary::new().on_facets(vec![]),
    );

    let species = aggregator.aggregate(&park_area(), 1).await.unwrap();
    assert!(species.is_empty());
}

#[tokio::test]
async fn failed_detail_lookup_drops_only_that_species() {
    let secondary = MockSecondary::new()
        .on_facets(vec![(MALLARD_GBIF, 7), (404, 50)])
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard"), "Aves"));
    let aggregator = SpeciesAggregator::new(MockPrimary::new().on_species_counts(vec![]), secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species.len(), 1);
    assert_eq!(species[0].taxon_id, TaxonId::Secondary(MALLARD_GBIF));
}

#[tokio::test]
async fn nameless_secondary_species_never_appear() {
    let nameless = gbif_client::Species {
        vernacular_name: Some("Mystery beetle".into()),
        kingdom: Some("Animalia".into()),
        class: Some("Insecta".into()),
        ..Default::default()
    };
    let secondary = MockSecondary::new()
        .on_facets(vec![(1, 99), (MALLARD_GBIF, 7)])
        .on_species(1, nameless)
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard"), "Aves"));
    let aggregator = SpeciesAggregator::new(MockPrimary::new().on_species_counts(vec![]), secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species.len(), 1);
    assert!(species.iter().all(|s| s.common_name != "Mystery beetle"));
    assert!(!aggregator
        .primary()
        .calls()
        .iter()
        .any(|c| c.contains("Mystery")));
}

// ---------------------------------------------------------------------------
// Backfill fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fuzzy_fallback_supplies_photo_and_common_name() {
    let secondary = MockSecondary::new()
        .on_facets(vec![(MALLARD_GBIF, 7)])
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", None, "Aves"));
    let primary = MockPrimary::new().on_species_counts(vec![]).on_autocomplete(
        "Anas platyrhynchos",
        inat_taxon(6930, "Anas platyrhynchos", Some("Mallard"), Some("https://static.inaturalist.org/mallard.jpg")),
    );
    let aggregator = SpeciesAggregator::new(primary, secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    let mallard = &species[0];
    assert_eq!(mallard.common_name, "Mallard");
    assert_eq!(mallard.photo_url.as_deref(), Some("https://static.inaturalist.org/mallard.jpg"));
    // identity stays in the secondary namespace
    assert_eq!(mallard.taxon_id, TaxonId::Secondary(MALLARD_GBIF));
}

#[tokio::test]
async fn media_failure_falls_through_to_fuzzy_lookup() {
    let secondary = MockSecondary::new()
        .on_facets(vec![(MALLARD_GBIF, 7)])
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard duck"), "Aves"))
        .failing_photo(MALLARD_GBIF);
    let primary = MockPrimary::new().on_species_counts(vec![]).on_autocomplete(
        "Anas platyrhynchos",
        inat_taxon(6930, "Anas platyrhynchos", None, Some("fallback.jpg")),
    );
    let aggregator = SpeciesAggregator::new(primary, secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species[0].photo_url.as_deref(), Some("fallback.jpg"));
    // no better name offered, so the vernacular name stays
    assert_eq!(species[0].common_name, "Mallard duck");
}

#[tokio::test]
async fn fully_failed_backfill_leaves_photo_empty() {
    let secondary = MockSecondary::new()
        .on_facets(vec![(MALLARD_GBIF, 7)])
        .on_species(MALLARD_GBIF, gbif_species("Anas platyrhynchos", Some("Mallard"), "Aves"))
        .failing_photo(MALLARD_GBIF);
    let primary = MockPrimary::new()
        .on_species_counts(vec![])
        .failing_autocomplete("Anas platyrhynchos");
    let aggregator = SpeciesAggregator::new(primary, secondary);

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species.len(), 1);
    assert_eq!(species[0].photo_url, None);
    assert_eq!(species[0].common_name, "Mallard");
}

// ---------------------------------------------------------------------------
// Concurrency & input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn detail_lookups_respect_concurrency_cap() {
    let mut secondary = MockSecondary::new().on_facets((1..=12).map(|k| (k, 100 - k)).collect());
    for key in 1..=12u64 {
        secondary = secondary.on_species(key, gbif_species(&format!("Genus species{key}"), None, "Aves"));
    }
    let aggregator = SpeciesAggregator::new(MockPrimary::new().on_species_counts(vec![]), secondary)
        .with_config(AggregatorConfig {
            concurrency: 3,
            ..Default::default()
        });

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species.len(), 12);
    assert_eq!(aggregator.secondary().peak_detail_concurrency(), 3);
}

#[tokio::test]
async fn backfill_runs_in_capped_batches() {
    // seven secondary-only species, none with media, none known to the primary
    let mut secondary = MockSecondary::new().on_facets((1..=7).map(|k| (k, 50 - k)).collect());
    for key in 1..=7u64 {
        secondary = secondary.on_species(key, gbif_species(&format!("Genus species{key}"), None, "Aves"));
    }
    let aggregator = SpeciesAggregator::new(MockPrimary::new().on_species_counts(vec![]), secondary)
        .with_config(AggregatorConfig {
            concurrency: 3,
            ..Default::default()
        });

    let species = aggregator.aggregate(&park_area(), 5).await.unwrap();
    assert_eq!(species.len(), 7);
    assert!(species.iter().all(|s| s.photo_url.is_none()));

    assert_eq!(aggregator.secondary().peak_photo_concurrency(), 3);
    assert_eq!(aggregator.primary().peak_autocomplete_concurrency(), 3);

    let photo_calls = aggregator
        .secondary()
        .calls()
        .iter()
        .filter(|c| c.starts_with("occurrence_photo:"))
        .count();
    let fallback_calls = aggregator
        .primary()
        .calls()
        .iter()
        .filter(|c| c.starts_with("autocomplete:"))
        .count();
    assert_eq!(photo_calls, 7);
    assert_eq!(fallback_calls, 7);
}

#[tokio::test]
async fn month_outside_calendar_is_rejected() {
    let aggregator = SpeciesAggregator::new(heron_primary(), heron_and_mallard_secondary());
    let err = aggregator.aggregate(&park_area(), 13).await.unwrap_err();
    assert!(matches!(err, NatureCardError::InvalidQuery(_)));
    assert!(aggregator.primary().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Per-taxon lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_lookup_skips_secondary_ids() {
    let mut taxon = inat_taxon(HERON_INAT, "Ardea herodias", None, None);
    taxon.wikipedia_summary = Some("The <b>great blue heron</b> is a wading bird.".into());
    let aggregator = SpeciesAggregator::new(MockPrimary::new().on_taxon(taxon), MockSecondary::new());

    let summary = aggregator.taxon_summary(&TaxonId::Primary(HERON_INAT)).await.unwrap();
    assert_eq!(summary.as_deref(), Some("The great blue heron is a wading bird."));

    // a GBIF key that happens to collide with an iNaturalist id must not be looked up
    let none = aggregator.taxon_summary(&TaxonId::Secondary(HERON_INAT)).await.unwrap();
    assert_eq!(none, None);
    assert_eq!(aggregator.primary().calls(), vec![format!("taxon:{HERON_INAT}")]);
}

#[tokio::test]
async fn observations_are_cached_per_area() {
    let primary = MockPrimary::new().on_observations(
        HERON_INAT,
        vec![
            Observation { id: 1, location: Some("37.77,-122.48".into()) },
            Observation { id: 2, location: None },
        ],
    );
    let aggregator = SpeciesAggregator::new(primary, MockSecondary::new());
    let mut cache = ObservationCache::new(park_area());
    let heron = TaxonId::Primary(HERON_INAT);

    let first = aggregator.observations_cached(&mut cache, &heron).await.unwrap();
    let second = aggregator.observations_cached(&mut cache, &heron).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, 1);
    assert_eq!(aggregator.primary().calls().len(), 1);

    cache.rebind(SearchArea::new(37.0, -122.0, 5.0).unwrap());
    aggregator.observations_cached(&mut cache, &heron).await.unwrap();
    assert_eq!(aggregator.primary().calls().len(), 2);

    let secondary_only = aggregator
        .observations_cached(&mut cache, &TaxonId::Secondary(MALLARD_GBIF))
        .await
        .unwrap();
    assert!(secondary_only.is_empty());
    assert_eq!(aggregator.primary().calls().len(), 2);
}
