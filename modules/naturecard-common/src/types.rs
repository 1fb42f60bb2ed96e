use serde::{Deserialize, Serialize};

// --- Category ---

/// Coarse taxonomic grouping used for filtering and iconography.
///
/// The vocabulary is the primary provider's "iconic taxon" label set.
/// `Animalia` is the fallback for animals outside the named classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Aves,
    Mammalia,
    Plantae,
    Insecta,
    Reptilia,
    Amphibia,
    Fungi,
    Arachnida,
    Mollusca,
    Actinopterygii,
    Animalia,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Aves,
        Category::Mammalia,
        Category::Plantae,
        Category::Insecta,
        Category::Reptilia,
        Category::Amphibia,
        Category::Fungi,
        Category::Arachnida,
        Category::Mollusca,
        Category::Actinopterygii,
        Category::Animalia,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Aves => "Aves",
            Category::Mammalia => "Mammalia",
            Category::Plantae => "Plantae",
            Category::Insecta => "Insecta",
            Category::Reptilia => "Reptilia",
            Category::Amphibia => "Amphibia",
            Category::Fungi => "Fungi",
            Category::Arachnida => "Arachnida",
            Category::Mollusca => "Mollusca",
            Category::Actinopterygii => "Actinopterygii",
            Category::Animalia => "Animalia",
            Category::Unknown => "Unknown",
        }
    }

    /// Parse a provider label. Anything outside the vocabulary is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .unwrap_or(Category::Unknown)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Aves => "🐦",
            Category::Mammalia => "🐿️",
            Category::Plantae => "🌿",
            Category::Insecta => "🐛",
            Category::Reptilia => "🦎",
            Category::Amphibia => "🐸",
            Category::Fungi => "🍄",
            Category::Arachnida => "🕷️",
            Category::Mollusca => "🐌",
            Category::Actinopterygii => "🐟",
            Category::Animalia | Category::Unknown => "🔬",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection-screen filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Aves,
    Mammalia,
    Plantae,
    Insecta,
    Other,
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Aves => category == Category::Aves,
            CategoryFilter::Mammalia => category == Category::Mammalia,
            CategoryFilter::Plantae => category == Category::Plantae,
            CategoryFilter::Insecta => category == Category::Insecta,
            CategoryFilter::Other => !matches!(
                category,
                Category::Aves | Category::Mammalia | Category::Plantae | Category::Insecta
            ),
        }
    }
}

// --- Identity & provenance ---

/// A taxon identifier tagged with the provider namespace it belongs to.
///
/// iNaturalist taxon ids and GBIF species keys are disjoint numeric spaces;
/// per-taxon primary-provider lookups are only valid for `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "id")]
pub enum TaxonId {
    #[serde(rename = "inaturalist")]
    Primary(u64),
    #[serde(rename = "gbif")]
    Secondary(u64),
}

impl TaxonId {
    pub fn primary(&self) -> Option<u64> {
        match self {
            TaxonId::Primary(id) => Some(*id),
            TaxonId::Secondary(_) => None,
        }
    }

    pub fn secondary(&self) -> Option<u64> {
        match self {
            TaxonId::Secondary(key) => Some(*key),
            TaxonId::Primary(_) => None,
        }
    }
}

impl std::fmt::Display for TaxonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxonId::Primary(id) => write!(f, "inaturalist:{id}"),
            TaxonId::Secondary(key) => write!(f, "gbif:{key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "inaturalist")]
    Primary,
    #[serde(rename = "gbif")]
    Secondary,
    #[serde(rename = "both")]
    Both,
}

// --- Species ---

/// One species observed in a search area, normalized across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub taxon_id: TaxonId,
    pub common_name: String,
    pub scientific_name: String,
    pub photo_url: Option<String>,
    pub category: Category,
    pub observation_count: u64,
    pub provenance: Provenance,
}

impl SpeciesRecord {
    /// Join key used when reconciling providers.
    pub fn merge_key(&self) -> String {
        self.scientific_name.to_lowercase()
    }

    pub fn emoji(&self) -> &'static str {
        self.category.emoji()
    }
}

/// A single georeferenced observation of a taxon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
}
