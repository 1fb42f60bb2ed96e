pub mod aggregator;
pub mod backfill;
pub mod batch;
pub mod geo;
pub mod merge;
pub mod observations;
pub mod primary;
pub mod secondary;
pub mod taxonomy;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use aggregator::{AggregateStats, AggregatorConfig, SpeciesAggregator};
pub use geo::{BoundingBox, SearchArea};
pub use merge::merge;
pub use observations::ObservationCache;
pub use taxonomy::map_category;
pub use traits::{PrimarySource, SecondarySource};
