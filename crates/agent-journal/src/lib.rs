//! Durable execution journal.
//!
//! Every side-effecting step of an orchestration instance goes through
//! [`Journal::execute_once`]: the first execution runs the action and records
//! its result durably before returning it; when the instance is re-driven
//! from the beginning after a crash, recorded steps are returned without
//! re-invoking the side effect. The loop engine never learns whether a given
//! step was live or replayed.

pub mod journal;
pub mod store;

pub use journal::{Journal, JournalError, StepError};
pub use store::{JournalStore, JsonlJournal, MemoryJournal, StepRecord};
