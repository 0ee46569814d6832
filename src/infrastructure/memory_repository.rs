// In-memory record source for development and tests
use crate::application::record_repository::RecordRepository;
use crate::domain::record::SensorRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Each lathe's history is kept newest first.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    collections: RwLock<BTreeMap<i64, Vec<SensorRecord>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRepository {
    async fn list_machine_ids(&self) -> Result<Vec<i64>> {
        Ok(self.collections.read().await.keys().copied().collect())
    }

    async fn machine_exists(&self, machine_id: i64) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(&machine_id))
    }

    async fn fetch_recent(&self, machine_id: i64, limit: usize) -> Result<Vec<SensorRecord>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&machine_id)
            .map(|records| records.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_all(&self, machine_id: i64) -> Result<Vec<SensorRecord>> {
        Ok(self
            .collections
            .read()
            .await
            .get(&machine_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn write_records(&self, machine_id: i64, records: &[SensorRecord]) -> Result<()> {
        let mut history = records.to_vec();
        history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        tracing::debug!(lathe_id = machine_id, records = history.len(), "Replacing lathe history");
        self.collections.write().await.insert(machine_id, history);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::fixtures::record;

    #[tokio::test]
    async fn test_fetch_recent_is_newest_first_and_bounded() {
        let repo = InMemoryRepository::new();
        let records = vec![record(1, 3, 70.0), record(1, 0, 90.0), record(1, 1, 80.0)];
        repo.write_records(1, &records).await.unwrap();

        let recent = repo.fetch_recent(1, 2).await.unwrap();
        let scores: Vec<f64> = recent.iter().map(|r| r.health_score).collect();
        assert_eq!(scores, vec![90.0, 80.0]);
        assert_eq!(repo.fetch_all(1).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_machine_reads_empty() {
        let repo = InMemoryRepository::new();
        assert!(repo.fetch_recent(7, 50).await.unwrap().is_empty());
        assert!(repo.fetch_all(7).await.unwrap().is_empty());
        assert!(!repo.machine_exists(7).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_replaces_history() {
        let repo = InMemoryRepository::new();
        repo.write_records(2, &[record(2, 0, 50.0), record(2, 1, 55.0)])
            .await
            .unwrap();
        repo.write_records(2, &[]).await.unwrap();

        assert!(repo.machine_exists(2).await.unwrap());
        assert!(repo.fetch_all(2).await.unwrap().is_empty());
        assert_eq!(repo.list_machine_ids().await.unwrap(), vec![2]);
    }
}
