use naturecard_common::Category;

/// Translate GBIF kingdom/phylum/class into the iconic-taxon vocabulary.
///
/// Total: unmapped input degrades to `Animalia` (animals) or `Unknown`.
pub fn map_category(kingdom: Option<&str>, phylum: Option<&str>, class: Option<&str>) -> Category {
    match kingdom {
        Some("Plantae") => Category::Plantae,
        Some("Fungi") => Category::Fungi,
        Some("Animalia") => match class {
            Some("Aves") => Category::Aves,
            Some("Mammalia") => Category::Mammalia,
            Some("Reptilia") => Category::Reptilia,
            Some("Amphibia") => Category::Amphibia,
            Some("Insecta") => Category::Insecta,
            Some("Arachnida") => Category::Arachnida,
            Some("Actinopterygii") => Category::Actinopterygii,
            _ if phylum == Some("Mollusca") => Category::Mollusca,
            _ => Category::Animalia,
        },
        _ => Category::Unknown,
    }
}
