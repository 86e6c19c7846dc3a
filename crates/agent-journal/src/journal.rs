use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::store::{JournalStore, StepRecord};

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("journal store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("failed to encode step {seq} ({label}): {source}")]
    Encode {
        seq: u64,
        label: String,
        source: serde_json::Error,
    },

    #[error("failed to decode recorded step {seq} ({label}): {source}")]
    Decode {
        seq: u64,
        label: String,
        source: serde_json::Error,
    },

    /// Replay reached a step whose recorded label does not match the step
    /// being executed. The journal and the orchestrating logic have diverged;
    /// not recoverable in-process.
    #[error("replay mismatch at step {seq}: executing '{executing}' but journal recorded '{recorded}'")]
    ReplayMismatch {
        seq: u64,
        executing: String,
        recorded: String,
    },
}

/// Error from `execute_once`: either the journal itself failed, or the action
/// did (in which case nothing was recorded and the step will run again on the
/// next replay attempt).
#[derive(Error, Debug)]
pub enum StepError<E> {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("{0}")]
    Action(E),
}

/// Per-instance journal handle. Holds the recorded prefix of the instance's
/// history and a cursor over it; once the prefix is exhausted every further
/// step is live.
pub struct Journal {
    instance_id: String,
    store: Arc<dyn JournalStore>,
    recorded: VecDeque<StepRecord>,
    next_seq: u64,
}

impl Journal {
    /// Load the recorded history for `instance_id`. A fresh instance simply
    /// has an empty history.
    pub async fn resume(
        store: Arc<dyn JournalStore>,
        instance_id: impl Into<String>,
    ) -> Result<Self, JournalError> {
        let instance_id = instance_id.into();
        let recorded: VecDeque<StepRecord> = store.load(&instance_id).await?.into();
        if !recorded.is_empty() {
            log::info!(
                "[{}] resuming with {} recorded steps",
                instance_id,
                recorded.len()
            );
        }
        Ok(Self {
            instance_id,
            store,
            recorded,
            next_seq: 0,
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Number of steps executed or replayed so far.
    pub fn position(&self) -> u64 {
        self.next_seq
    }

    /// True while the journal is still serving recorded steps.
    pub fn replaying(&self) -> bool {
        !self.recorded.is_empty()
    }

    /// Run `action` at most once for this position in the instance's history.
    ///
    /// On replay the recorded result is returned and `action` is dropped
    /// unawaited, so the side effect never starts. On live execution the
    /// result is appended durably before it is returned; if the action fails,
    /// nothing is recorded and the error propagates to the host, whose retry
    /// (a full re-drive of the instance) will reach this step again.
    pub async fn execute_once<T, E, Fut>(
        &mut self,
        label: &str,
        action: Fut,
    ) -> Result<T, StepError<E>>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, E>>,
    {
        let seq = self.next_seq;

        if let Some(record) = self.recorded.pop_front() {
            if record.label != label || record.seq != seq {
                return Err(StepError::Journal(JournalError::ReplayMismatch {
                    seq,
                    executing: label.to_string(),
                    recorded: format!("{} (seq {})", record.label, record.seq),
                }));
            }

            let value =
                serde_json::from_value(record.value).map_err(|source| JournalError::Decode {
                    seq,
                    label: label.to_string(),
                    source,
                })?;

            log::debug!("[{}] step {} '{}' replayed", self.instance_id, seq, label);
            self.next_seq += 1;
            return Ok(value);
        }

        let value = action.await.map_err(StepError::Action)?;

        let encoded = serde_json::to_value(&value).map_err(|source| JournalError::Encode {
            seq,
            label: label.to_string(),
            source,
        })?;
        let record = StepRecord::new(seq, label, encoded);
        self.store
            .append(&self.instance_id, &record)
            .await
            .map_err(JournalError::Store)?;

        log::debug!("[{}] step {} '{}' recorded", self.instance_id, seq, label);
        self.next_seq += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryJournal;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(counter: &AtomicUsize, value: &str) -> Result<String, Infallible> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn replay_returns_recorded_results_without_rerunning_actions() {
        let store = Arc::new(MemoryJournal::new());
        let calls = AtomicUsize::new(0);

        let mut journal = Journal::resume(store.clone(), "instance-1").await.unwrap();
        let first: String = journal
            .execute_once("completion", counted(&calls, "one"))
            .await
            .unwrap();
        let second: String = journal
            .execute_once("tool:echo", counted(&calls, "two"))
            .await
            .unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("one", "two"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Re-drive the same instance from the top.
        let mut journal = Journal::resume(store, "instance-1").await.unwrap();
        assert!(journal.replaying());
        let first: String = journal
            .execute_once("completion", counted(&calls, "changed"))
            .await
            .unwrap();
        let second: String = journal
            .execute_once("tool:echo", counted(&calls, "changed"))
            .await
            .unwrap();

        assert_eq!((first.as_str(), second.as_str()), ("one", "two"));
        assert_eq!(calls.load(Ordering::SeqCst), 2, "no re-invocation on replay");
        assert!(!journal.replaying());
    }

    #[tokio::test]
    async fn failed_action_is_not_recorded_and_reruns_on_next_drive() {
        let store = Arc::new(MemoryJournal::new());

        let mut journal = Journal::resume(store.clone(), "instance-1").await.unwrap();
        let failed: Result<String, StepError<&str>> = journal
            .execute_once("completion", async { Err("service unreachable") })
            .await;
        assert!(matches!(failed, Err(StepError::Action("service unreachable"))));
        assert_eq!(store.len("instance-1"), 0);

        let mut journal = Journal::resume(store.clone(), "instance-1").await.unwrap();
        let calls = AtomicUsize::new(0);
        let value: String = journal
            .execute_once("completion", counted(&calls, "recovered"))
            .await
            .unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len("instance-1"), 1);
    }

    #[tokio::test]
    async fn label_divergence_is_a_replay_mismatch() {
        let store = Arc::new(MemoryJournal::new());

        let mut journal = Journal::resume(store.clone(), "instance-1").await.unwrap();
        let _: String = journal
            .execute_once("completion", async { Ok::<_, Infallible>("one".to_string()) })
            .await
            .unwrap();

        let mut journal = Journal::resume(store, "instance-1").await.unwrap();
        let result: Result<String, StepError<Infallible>> = journal
            .execute_once("tool:echo", async { Ok("other".to_string()) })
            .await;

        assert!(matches!(
            result,
            Err(StepError::Journal(JournalError::ReplayMismatch { seq: 0, .. }))
        ));
    }
}
