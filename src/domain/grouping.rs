//! Grouping of item instances by identity and numbering of duplicates.

use std::collections::HashMap;

use super::entities::{CatalogItem, ItemIdentity, ItemInstance};

/// Instances of one identity within a side.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedEntry<'a> {
    pub identity: &'a ItemIdentity,
    pub count: usize,
    pub representative: &'a CatalogItem,
}

/// Groups instances by `(id, variant)`, keeping first-appearance order.
pub fn group(instances: &[ItemInstance]) -> Vec<GroupedEntry<'_>> {
    let mut positions: HashMap<(u64, &str), usize> = HashMap::new();
    let mut entries: Vec<GroupedEntry<'_>> = Vec::new();

    for instance in instances {
        let key = instance.identity().grouping_key();
        match positions.get(&key) {
            Some(&position) => entries[position].count += 1,
            None => {
                positions.insert(key, entries.len());
                entries.push(GroupedEntry {
                    identity: instance.identity(),
                    count: 1,
                    representative: &instance.item,
                });
            }
        }
    }

    entries
}

/// Assigns 1-based ordinals to instances that share an identity, oldest first.
///
/// Identities held only once get no ordinal. Equal timestamps keep input order.
pub fn order_duplicates<K, F>(instances: &[ItemInstance], timestamp_of: F) -> HashMap<String, usize>
where
    K: Ord,
    F: Fn(&ItemInstance) -> K,
{
    let mut partitions: HashMap<(u64, &str), Vec<&ItemInstance>> = HashMap::new();
    for instance in instances {
        partitions
            .entry(instance.identity().grouping_key())
            .or_default()
            .push(instance);
    }

    let mut ordinals = HashMap::new();
    for (_, mut members) in partitions {
        if members.len() < 2 {
            continue;
        }
        members.sort_by_key(|instance| timestamp_of(*instance));
        for (position, instance) in members.into_iter().enumerate() {
            ordinals.insert(instance.key.clone(), position + 1);
        }
    }

    ordinals
}
