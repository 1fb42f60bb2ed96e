use std::collections::HashMap;

use naturecard_common::{Provenance, SpeciesRecord};

/// Union two normalized lists by case-insensitive scientific name and rank by count.
///
/// Primary records are inserted first and keep their names and photos. Any
/// secondary record landing on an existing key adds its count and marks the
/// entry `Both`, including a second secondary record with the same name.
/// The sort is stable, so equal counts keep insertion order.
pub fn merge(primary: Vec<SpeciesRecord>, secondary: Vec<SpeciesRecord>) -> Vec<SpeciesRecord> {
    let mut order: Vec<SpeciesRecord> = Vec::with_capacity(primary.len() + secondary.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in primary {
        let key = record.merge_key();
        match index.get(&key) {
            // duplicate within one provider: keep the first, sum counts
            Some(&i) => order[i].observation_count += record.observation_count,
            None => {
                index.insert(key, order.len());
                order.push(record);
            }
        }
    }

    for record in secondary {
        let key = record.merge_key();
        match index.get(&key) {
            Some(&i) => {
                let existing = &mut order[i];
                existing.observation_count += record.observation_count;
                existing.provenance = Provenance::Both;
            }
            None => {
                index.insert(key, order.len());
                order.push(record);
            }
        }
    }

    order.sort_by(|a, b| b.observation_count.cmp(&a.observation_count));
    order
}
