// Storage module: reading store and cycle repository.

pub mod memory;
pub mod sqlite;

use crate::model::{CycleSpan, Reading, SpanBounds, StorageError};
use std::collections::HashSet;
use tracing::warn;

pub use memory::{InMemoryCycleRepository, InMemoryReadingStore};
pub use sqlite::SqliteStorage;

/// Append-only source of a user's readings.
pub trait ReadingStore {
    /// All readings of the user, ordered by timestamp.
    fn list_readings(&self, user_id: &str) -> Result<Vec<Reading>, StorageError>;
    fn append_reading(&self, reading: &Reading) -> Result<(), StorageError>;
}

/// Per-user cycle spans. `replace_spans` swaps the whole set at once, so
/// readers see either the old set or the new one.
pub trait CycleRepository {
    fn replace_spans(
        &self,
        user_id: &str,
        spans: &[SpanBounds],
    ) -> Result<Vec<CycleSpan>, StorageError>;
    /// Ascending by start date.
    fn list_spans(&self, user_id: &str) -> Result<Vec<CycleSpan>, StorageError>;
    fn get_span(&self, user_id: &str, id: i64) -> Result<Option<CycleSpan>, StorageError>;
}

/// Appends readings whose (user, timestamp) is not stored yet and returns
/// how many were saved. A failed append is logged and skipped.
pub fn append_unseen<S: ReadingStore + ?Sized>(
    store: &S,
    readings: &[Reading],
) -> Result<usize, StorageError> {
    let mut seen = HashSet::new();
    let users: HashSet<&str> = readings.iter().map(|r| r.user_id.as_str()).collect();
    for user_id in users {
        seen.extend(store.list_readings(user_id)?.into_iter().map(|r| (r.user_id, r.timestamp)));
    }

    let mut saved = 0;
    for reading in readings {
        if !seen.insert((reading.user_id.clone(), reading.timestamp)) {
            continue;
        }
        match store.append_reading(reading) {
            Ok(()) => saved += 1,
            Err(e) => warn!("DB save error: {:?}", e),
        }
    }
    Ok(saved)
}
