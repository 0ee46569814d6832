// Lathe domain model and the per-request views derived from its records
use super::aggregate::ChannelStats;
use super::breakdown::ProductBreakdown;
use super::record::SensorChannel;
use super::status::MachineStatus;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Lathe {
    pub id: i64,
    pub name: String,
}

impl Lathe {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: Self::format_name(id),
        }
    }

    fn format_name(id: i64) -> String {
        format!("Lathe M{}", id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineSummary {
    pub lathe: Lathe,
    pub health_score: f64,
    pub uptime: f64,
    pub status: MachineStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MachineDetail {
    pub summary: MachineSummary,
    /// Channel means rounded to one decimal; vibration only when observed.
    pub channel_means: BTreeMap<SensorChannel, f64>,
    pub failure_count: usize,
    pub product_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub lathe: Lathe,
    /// Readings most-recent-first.
    pub values: BTreeMap<SensorChannel, Vec<f64>>,
    pub stats: BTreeMap<SensorChannel, ChannelStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductAnalysis {
    pub lathe: Lathe,
    pub breakdown: ProductBreakdown,
}
