use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::ports::EntryStore;
use crate::types::{ConfigEntry, FinalConfig};

/// Entries held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: RwLock<Vec<ConfigEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(configs: Vec<FinalConfig>) -> Self {
        let entries = configs
            .into_iter()
            .enumerate()
            .map(|(idx, data)| ConfigEntry {
                entry_id: entry_id(idx),
                title: data.title(),
                data,
                created_at: Utc::now(),
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn entries(&self) -> Vec<ConfigEntry> {
        self.entries.read().await.clone()
    }
}

fn entry_id(idx: usize) -> String {
    format!("entry-{}", idx + 1)
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn find_by_host(&self, host: &str) -> Result<Option<ConfigEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.data.host == host).cloned())
    }

    async fn find_any(&self) -> Result<Option<ConfigEntry>> {
        Ok(self.entries.read().await.first().cloned())
    }

    async fn create_entry(&self, title: &str, data: &FinalConfig) -> Result<ConfigEntry> {
        let mut entries = self.entries.write().await;
        let entry = ConfigEntry {
            entry_id: entry_id(entries.len()),
            title: title.to_string(),
            data: data.clone(),
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        tracing::debug!(entry_id = %entry.entry_id, "Stored entry");
        Ok(entry)
    }
}
