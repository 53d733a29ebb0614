//! Merged-record index
//!
//! One ordered map per filter key, so a filtered "latest N" query walks at
//! most N entries from the end instead of scanning the whole history.

use std::collections::{BTreeMap, HashMap};

use contracts::{BatchOrigin, RecordFilter};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FilterKey {
    All,
    Session(String),
    Device(String),
    Pair(String, String),
}

impl FilterKey {
    fn for_filter(filter: &RecordFilter) -> Self {
        match (&filter.session_id, &filter.device_id) {
            (None, None) => Self::All,
            (Some(s), None) => Self::Session(s.clone()),
            (None, Some(d)) => Self::Device(d.clone()),
            (Some(s), Some(d)) => Self::Pair(s.clone(), d.clone()),
        }
    }

    fn for_origin(origin: &BatchOrigin) -> [Self; 4] {
        [
            Self::All,
            Self::Session(origin.session_id.clone()),
            Self::Device(origin.device_id.clone()),
            Self::Pair(origin.session_id.clone(), origin.device_id.clone()),
        ]
    }
}

/// Ordering key: record timestamp (ms), then insertion sequence
type SortKey = (i64, u64);

/// Index from filter keys to record positions `P` (slot, byte offset, ...)
#[derive(Debug)]
pub struct RecordIndex<P> {
    next_seq: u64,
    keys: HashMap<FilterKey, BTreeMap<SortKey, P>>,
}

impl<P> Default for RecordIndex<P> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            keys: HashMap::new(),
        }
    }
}

impl<P: Copy> RecordIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: &BatchOrigin, timestamp_ms: i64, position: P) {
        let key = (timestamp_ms, self.next_seq);
        self.next_seq += 1;
        for filter_key in FilterKey::for_origin(origin) {
            self.keys.entry(filter_key).or_default().insert(key, position);
        }
    }

    /// Positions of the latest `limit` matches, oldest first, and the match count
    pub fn latest(&self, filter: &RecordFilter, limit: usize) -> (Vec<P>, usize) {
        let Some(entries) = self.keys.get(&FilterKey::for_filter(filter)) else {
            return (Vec::new(), 0);
        };
        let mut positions: Vec<P> = entries.values().rev().take(limit).copied().collect();
        positions.reverse();
        (positions, entries.len())
    }

    /// Indexed records
    pub fn len(&self) -> usize {
        self.keys.get(&FilterKey::All).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(session: &str, device: &str) -> BatchOrigin {
        BatchOrigin {
            message_id: 0,
            session_id: session.into(),
            device_id: device.into(),
        }
    }

    #[test]
    fn test_latest_is_ordered_by_timestamp() {
        let mut index = RecordIndex::new();
        // arrival order differs from timestamp order
        index.insert(&origin("s", "d"), 30, 0usize);
        index.insert(&origin("s", "d"), 10, 1);
        index.insert(&origin("s", "d"), 20, 2);

        let (positions, total) = index.latest(&RecordFilter::default(), 2);
        assert_eq!(positions, vec![2, 0]);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let mut index = RecordIndex::new();
        index.insert(&origin("s", "d"), 5, 'a');
        index.insert(&origin("s", "d"), 5, 'b');
        let (positions, _) = index.latest(&RecordFilter::default(), 10);
        assert_eq!(positions, vec!['a', 'b']);
    }

    #[test]
    fn test_filter_keys() {
        let mut index = RecordIndex::new();
        index.insert(&origin("s1", "d1"), 1, 1u64);
        index.insert(&origin("s1", "d2"), 2, 2);
        index.insert(&origin("s2", "d1"), 3, 3);

        let by_device = RecordFilter {
            session_id: None,
            device_id: Some("d1".into()),
        };
        assert_eq!(index.latest(&by_device, 10), (vec![1, 3], 2));

        let pair = RecordFilter {
            session_id: Some("s1".into()),
            device_id: Some("d2".into()),
        };
        assert_eq!(index.latest(&pair, 10), (vec![2], 1));

        let missing = RecordFilter {
            session_id: Some("nope".into()),
            device_id: None,
        };
        assert_eq!(index.latest(&missing, 10), (vec![], 0));
        assert_eq!(index.len(), 3);
    }
}
