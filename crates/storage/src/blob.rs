//! Encoding of the persisted stats blob: one JSON object mapping card id to
//! its `CardStats` record.

use std::collections::BTreeMap;

use flash_core::model::{CardId, CardStats, StatsMap};

use crate::repository::StorageError;

/// Storage key the blob lives under.
pub const STATS_KEY: &str = "flashcard-stats";

/// Serialize all stats. Keys are written in sorted order so the blob is stable.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if a record cannot be encoded.
pub fn encode(stats: &StatsMap) -> Result<String, StorageError> {
    let ordered: BTreeMap<&CardId, &CardStats> = stats.iter().collect();
    serde_json::to_string(&ordered).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a blob. An empty string is an empty map.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the blob is not a valid id → stats object.
pub fn decode(raw: &str) -> Result<StatsMap, StorageError> {
    if raw.trim().is_empty() {
        return Ok(StatsMap::new());
    }
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Last write wins: every record replaces whatever was stored under its id.
pub fn merge<'a>(into: &mut StatsMap, records: impl IntoIterator<Item = &'a CardStats>) {
    for record in records {
        into.insert(record.id.clone(), record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flash_core::time::fixed_now;

    #[test]
    fn blob_is_flat_object_keyed_by_id() {
        let mut map = StatsMap::new();
        let stats = CardStats::unseen(CardId::new("net-1"), fixed_now());
        merge(&mut map, [&stats]);

        let raw = encode(&map).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["net-1"]["ease"], 2.5);
        assert_eq!(decode(&raw).unwrap(), map);
    }

    #[test]
    fn empty_blob_decodes_to_empty_map() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("  ").unwrap().is_empty());
    }

    #[test]
    fn garbage_blob_is_a_serialization_error() {
        assert!(matches!(
            decode("[1,2,3]"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn merge_overwrites_existing_records() {
        let mut map = StatsMap::new();
        let first = CardStats::unseen(CardId::new("a"), fixed_now());
        merge(&mut map, [&first]);

        let mut second = first.clone();
        second.reviews = 4;
        merge(&mut map, [&second]);

        assert_eq!(map.len(), 1);
        assert_eq!(map[&CardId::new("a")].reviews, 4);
    }
}
