//! Deduplicating, persistent error record store.
//!
//! `add` is an O(n) identity scan; the set holds distinct errors, not
//! occurrences, so it stays small. Every mutation writes the whole list
//! back through the backend; a failed write degrades that mutation to
//! in-memory state instead of surfacing an error into the capture path.

use tracing::{debug, error};

use crate::persist::PersistenceBackend;
use crate::record::ErrorRecord;

/// What a resolve call did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Index did not address a visible record; nothing changed.
    NotFound,
    /// Record marked resolved; others remain visible.
    Resolved,
    /// Record marked resolved and no unresolved records remain.
    Drained,
}

pub struct ErrorStore {
    records: Vec<ErrorRecord>,
    backend: Box<dyn PersistenceBackend>,
}

impl ErrorStore {
    pub fn new(backend: Box<dyn PersistenceBackend>) -> Self {
        Self {
            records: Vec::new(),
            backend,
        }
    }

    /// Replace in-memory state with whatever the backend holds.
    ///
    /// An unreadable store starts empty rather than failing init; the
    /// session then runs in-memory until the next successful write.
    pub fn hydrate(&mut self) {
        match self.backend.load() {
            Ok(records) => {
                debug!("hydrated {} persisted error records", records.len());
                self.records = records;
            }
            Err(err) => {
                error!("could not load persisted error records: {err}");
                self.records.clear();
            }
        }
    }

    /// Insert a record unless an equal (message, stack) one already
    /// exists. Returns whether the record was inserted.
    pub fn add(&mut self, record: ErrorRecord) -> bool {
        if self.records.iter().any(|existing| existing.same_error(&record)) {
            debug!("duplicate error suppressed: {}", record.message);
            return false;
        }
        self.records.push(record);
        self.persist();
        true
    }

    /// Resolve the record at `index` of the unresolved-only view.
    ///
    /// The view index is mapped back to the underlying record through the
    /// same filtered sequence the view was built from, so rows hidden by
    /// earlier resolves can never shift the target.
    pub fn resolve_visible(&mut self, index: usize) -> ResolveOutcome {
        let Some(position) = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.resolved)
            .map(|(position, _)| position)
            .nth(index)
        else {
            return ResolveOutcome::NotFound;
        };

        self.records[position].resolved = true;
        self.persist();

        if self.records.iter().all(|record| record.resolved) {
            ResolveOutcome::Drained
        } else {
            ResolveOutcome::Resolved
        }
    }

    /// Unresolved records in insertion order.
    pub fn current_view(&self) -> Vec<&ErrorRecord> {
        self.records.iter().filter(|record| !record.resolved).collect()
    }

    /// Every record, resolved or not.
    pub fn all(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Final write, for service teardown.
    pub fn flush(&self) {
        self.persist();
    }

    /// Write the full set back. Failures are logged and swallowed; the
    /// store stays usable in memory.
    fn persist(&self) {
        if let Err(err) = self.backend.save(&self.records) {
            error!("could not persist error records: {err}");
        }
    }
}
