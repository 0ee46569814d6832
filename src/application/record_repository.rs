// Repository trait for lathe record access
use crate::domain::record::SensorRecord;
use async_trait::async_trait;

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// List all lathe IDs that have a record collection, ascending
    async fn list_machine_ids(&self) -> anyhow::Result<Vec<i64>>;

    /// Whether a record collection exists for this lathe
    async fn machine_exists(&self, machine_id: i64) -> anyhow::Result<bool>;

    /// Most recent `limit` records, newest first
    async fn fetch_recent(&self, machine_id: i64, limit: usize) -> anyhow::Result<Vec<SensorRecord>>;

    /// Full history of a lathe
    async fn fetch_all(&self, machine_id: i64) -> anyhow::Result<Vec<SensorRecord>>;

    /// Replace the history of a lathe with `records`
    async fn write_records(&self, machine_id: i64, records: &[SensorRecord]) -> anyhow::Result<()>;
}
