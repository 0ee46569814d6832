// Machine service - Use cases for lathe summaries, details and analyses
use crate::application::error::MachineError;
use crate::application::record_repository::RecordRepository;
use crate::domain::aggregate::{aggregate_window, channel_values, round_to, WindowAggregate};
use crate::domain::breakdown::ProductBreakdown;
use crate::domain::machine::{Lathe, MachineDetail, MachineSummary, ProductAnalysis, SensorReport};
use crate::domain::record::SensorRecord;
use crate::infrastructure::config::AggregationSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct MachineService {
    repository: Arc<dyn RecordRepository>,
    windows: AggregationSettings,
}

impl MachineService {
    pub fn new(repository: Arc<dyn RecordRepository>, windows: AggregationSettings) -> Self {
        Self { repository, windows }
    }

    /// Summaries for every lathe with at least one record
    pub async fn list_summaries(&self) -> Result<Vec<MachineSummary>, MachineError> {
        let ids = self.repository.list_machine_ids().await?;
        let mut summaries = Vec::with_capacity(ids.len());

        for id in ids {
            match self.summarize(id).await {
                Ok(summary) => summaries.push(summary),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(lathe_id = id, kind = e.kind(), "Skipping lathe without data");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summaries)
    }

    pub async fn summarize(&self, machine_id: i64) -> Result<MachineSummary, MachineError> {
        let window = self.window(machine_id, self.windows.summary_window).await?;
        let aggregate = Self::aggregate(machine_id, &window)?;
        Ok(Self::summary_of(machine_id, &aggregate))
    }

    pub async fn detail(&self, machine_id: i64) -> Result<MachineDetail, MachineError> {
        let window = self.window(machine_id, self.windows.detail_window).await?;
        let aggregate = Self::aggregate(machine_id, &window)?;

        let channel_means = aggregate
            .channels
            .iter()
            .map(|(&channel, stats)| (channel, round_to(stats.mean, 1)))
            .collect();

        Ok(MachineDetail {
            summary: Self::summary_of(machine_id, &aggregate),
            channel_means,
            failure_count: aggregate.failure_count,
            product_types: aggregate.product_counts,
        })
    }

    pub async fn sensor_stats(&self, machine_id: i64) -> Result<SensorReport, MachineError> {
        let window = self.window(machine_id, self.windows.detail_window).await?;
        let aggregate = Self::aggregate(machine_id, &window)?;

        Ok(SensorReport {
            lathe: Lathe::new(machine_id),
            values: channel_values(&window),
            stats: aggregate.channel_stats(),
        })
    }

    pub async fn product_analysis(&self, machine_id: i64) -> Result<ProductAnalysis, MachineError> {
        let history = self.repository.fetch_all(machine_id).await?;
        if history.is_empty() {
            return Err(self.explain_empty(machine_id).await);
        }

        tracing::debug!(lathe_id = machine_id, records = history.len(), "Computing product breakdown");
        Ok(ProductAnalysis {
            lathe: Lathe::new(machine_id),
            breakdown: ProductBreakdown::compute(&history),
        })
    }

    async fn window(&self, machine_id: i64, limit: usize) -> Result<Vec<SensorRecord>, MachineError> {
        let records = self.repository.fetch_recent(machine_id, limit).await?;
        if records.is_empty() {
            return Err(self.explain_empty(machine_id).await);
        }
        Ok(records)
    }

    /// Tell an unknown lathe apart from one whose collection holds no records
    async fn explain_empty(&self, machine_id: i64) -> MachineError {
        match self.repository.machine_exists(machine_id).await {
            Ok(false) => {
                tracing::warn!(lathe_id = machine_id, "No record collection for lathe");
                MachineError::UnknownMachine(machine_id)
            }
            Ok(true) => {
                tracing::warn!(lathe_id = machine_id, "Record collection for lathe is empty");
                MachineError::EmptyWindow(machine_id)
            }
            Err(e) => MachineError::Source(e),
        }
    }

    fn aggregate(machine_id: i64, window: &[SensorRecord]) -> Result<WindowAggregate, MachineError> {
        aggregate_window(window).map_err(|_| MachineError::EmptyWindow(machine_id))
    }

    /// Display figures are rounded to one decimal; status uses the unrounded mean.
    fn summary_of(machine_id: i64, aggregate: &WindowAggregate) -> MachineSummary {
        MachineSummary {
            lathe: Lathe::new(machine_id),
            health_score: round_to(aggregate.mean_health_score, 1),
            uptime: round_to(aggregate.mean_uptime, 1),
            status: aggregate.status,
        }
    }
}
