//! Shared history ledger.
//!
//! Process-wide, thread-safe, append-only log of run-boundary turns across
//! all concurrently running instances. Purely observational: the loop engine
//! never reads it and nothing in control flow depends on it. Constructed and
//! injected at process start, never a static singleton.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub use agent_core::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Content,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub ordinal: u64,
    pub entry_type: EntryType,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct HistoryLedger {
    counter: AtomicU64,
    records: Mutex<Vec<HistoryRecord>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increasing across all threads; no duplicates, no gaps.
    pub fn next_ordinal(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Append a turn, assigning its ordinal under the same lock that orders
    /// the log, so append order and ordinal order are the same total order.
    pub fn record(&self, entry_type: EntryType, role: Role, content: impl Into<String>) -> u64 {
        let mut records = self.records.lock().expect("ledger lock poisoned");
        let ordinal = self.next_ordinal();
        records.push(HistoryRecord {
            ordinal,
            entry_type,
            role,
            content: content.into(),
            timestamp: Utc::now(),
        });
        ordinal
    }

    /// Point-in-time copy; records appended afterwards are not visible in an
    /// already-returned snapshot.
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.records.lock().expect("ledger lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
