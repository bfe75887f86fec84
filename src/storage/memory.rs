use crate::model::{CycleSpan, Reading, SpanBounds, StorageError};
use crate::storage::{CycleRepository, ReadingStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-process cycle store. Each user's set is an immutable `Arc<Vec<_>>`
/// that a rebuild replaces wholesale.
pub struct InMemoryCycleRepository {
    spans: RwLock<HashMap<String, Arc<Vec<CycleSpan>>>>,
    next_id: AtomicI64,
}

impl InMemoryCycleRepository {
    pub fn new() -> Self {
        Self {
            spans: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Current set for a user without copying it.
    pub fn snapshot(&self, user_id: &str) -> Result<Arc<Vec<CycleSpan>>, StorageError> {
        let guard = self.spans.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

impl Default for InMemoryCycleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleRepository for InMemoryCycleRepository {
    fn replace_spans(
        &self,
        user_id: &str,
        spans: &[SpanBounds],
    ) -> Result<Vec<CycleSpan>, StorageError> {
        let mut fresh: Vec<CycleSpan> = spans
            .iter()
            .map(|b| CycleSpan {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                user_id: user_id.to_string(),
                start_date: b.start,
                end_date: b.end,
            })
            .collect();
        fresh.sort_by_key(|s| s.start_date);

        let mut guard = self.spans.write().map_err(|_| StorageError::LockPoisoned)?;
        if fresh.is_empty() {
            guard.remove(user_id);
        } else {
            guard.insert(user_id.to_string(), Arc::new(fresh.clone()));
        }
        debug!("Swapped {} spans for {}", fresh.len(), user_id);
        Ok(fresh)
    }

    fn list_spans(&self, user_id: &str) -> Result<Vec<CycleSpan>, StorageError> {
        Ok(self.snapshot(user_id)?.as_ref().clone())
    }

    fn get_span(&self, user_id: &str, id: i64) -> Result<Option<CycleSpan>, StorageError> {
        Ok(self.snapshot(user_id)?.iter().find(|s| s.id == id).cloned())
    }
}

/// In-process reading store, mostly for tests and one-shot imports.
#[derive(Default)]
pub struct InMemoryReadingStore {
    readings: RwLock<Vec<Reading>>,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadingStore for InMemoryReadingStore {
    fn list_readings(&self, user_id: &str) -> Result<Vec<Reading>, StorageError> {
        let guard = self.readings.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut result: Vec<Reading> =
            guard.iter().filter(|r| r.user_id == user_id).cloned().collect();
        result.sort_by_key(|r| r.timestamp);
        Ok(result)
    }

    fn append_reading(&self, reading: &Reading) -> Result<(), StorageError> {
        let mut guard = self.readings.write().map_err(|_| StorageError::LockPoisoned)?;
        guard.push(reading.clone());
        Ok(())
    }
}
