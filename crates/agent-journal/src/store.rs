use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// One recorded side-effecting step. `seq` is the position in the instance's
/// execution history; `label` names the kind of step so replay divergence is
/// caught instead of silently decoding the wrong record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub seq: u64,
    pub label: String,
    pub value: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl StepRecord {
    pub fn new(seq: u64, label: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            seq,
            label: label.into(),
            value,
            recorded_at: Utc::now(),
        }
    }
}

/// Durable backing for step records, keyed by instance id. Append must be
/// durable before it returns; load must preserve append order.
#[async_trait::async_trait]
pub trait JournalStore: Send + Sync {
    async fn append(&self, instance_id: &str, record: &StepRecord) -> std::io::Result<()>;
    async fn load(&self, instance_id: &str) -> std::io::Result<Vec<StepRecord>>;
}

/// One append-only JSONL file per instance under `base_path`.
#[derive(Debug, Clone)]
pub struct JsonlJournal {
    base_path: PathBuf,
}

impl JsonlJournal {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub async fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    fn journal_path(&self, instance_id: &str) -> PathBuf {
        // Instance ids contain '/' for sub-orchestrations; keep one flat file
        // per instance.
        let file_name = instance_id.replace('/', "_");
        self.base_path.join(format!("{}.jsonl", file_name))
    }
}

#[async_trait::async_trait]
impl JournalStore for JsonlJournal {
    async fn append(&self, instance_id: &str, record: &StepRecord) -> std::io::Result<()> {
        let path = self.journal_path(instance_id);
        let json = serde_json::to_string(record)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await
    }

    async fn load(&self, instance_id: &str) -> std::io::Result<Vec<StepRecord>> {
        let path = self.journal_path(instance_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut records = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line)?;
            records.push(record);
        }

        Ok(records)
    }
}

/// In-memory store for tests and embedded runs. Survives within one process,
/// which is enough to exercise replay by re-driving an instance against the
/// same store.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    records: RwLock<HashMap<String, Vec<StepRecord>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, instance_id: &str) -> usize {
        self.records
            .read()
            .map(|map| map.get(instance_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl JournalStore for MemoryJournal {
    async fn append(&self, instance_id: &str, record: &StepRecord) -> std::io::Result<()> {
        let mut map = self
            .records
            .write()
            .map_err(|_| std::io::Error::other("journal lock poisoned"))?;
        map.entry(instance_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn load(&self, instance_id: &str) -> std::io::Result<Vec<StepRecord>> {
        let map = self
            .records
            .read()
            .map_err(|_| std::io::Error::other("journal lock poisoned"))?;
        Ok(map.get(instance_id).cloned().unwrap_or_default())
    }
}
