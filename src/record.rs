use std::cmp::Ordering;

use bson::Bson;
use chrono::{DateTime, Utc};

/// A single timeseries observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V = Bson> {
    pub timestamp: DateTime<Utc>,
    pub value: V,
}

impl<V> Record<V> {
    pub fn new(timestamp: DateTime<Utc>, value: V) -> Self {
        Self { timestamp, value }
    }

    /// Oldest first.
    pub fn chronological(a: &Self, b: &Self) -> Ordering {
        a.timestamp.cmp(&b.timestamp)
    }

    /// Newest first.
    pub fn inverse_chronological(a: &Self, b: &Self) -> Ordering {
        b.timestamp.cmp(&a.timestamp)
    }
}

/// Sorts records newest-first in place.
pub fn sort_inverse_chronological<V>(records: &mut [Record<V>]) {
    records.sort_by(Record::inverse_chronological);
}

/// Counts reported by a batched upsert.
///
/// `matched` follows the store's `n`: a row that was inserted by the upsert
/// still counts as matched. `modified` only counts documents whose stored
/// contents actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertResult {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
}
