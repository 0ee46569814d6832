// Window aggregation over a machine's most recent records
use super::record::{SensorChannel, SensorRecord};
use super::status::MachineStatus;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("window contains no records")]
    EmptyWindow,
}

/// Round to `places` decimals, exact halves to the even digit.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// Arithmetic mean, `None` for an empty slice.
///
/// Values are summed in ascending order so the result does not depend on the
/// order of the input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ChannelStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { min, max, mean })
    }

    pub fn rounded(self, places: i32) -> Self {
        Self {
            min: round_to(self.min, places),
            max: round_to(self.max, places),
            mean: round_to(self.mean, places),
        }
    }
}

/// Values of every channel present in `records`, in record order.
///
/// Channels absent from every record are left out of the map.
pub fn channel_values<'a, I>(records: I) -> BTreeMap<SensorChannel, Vec<f64>>
where
    I: IntoIterator<Item = &'a SensorRecord>,
    I::IntoIter: Clone,
{
    let records = records.into_iter();
    SensorChannel::ALL
        .iter()
        .filter_map(|&channel| {
            let values: Vec<f64> = records.clone().filter_map(|r| channel.read(r)).collect();
            (!values.is_empty()).then_some((channel, values))
        })
        .collect()
}

/// Aggregate view of one window. All figures are unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAggregate {
    pub record_count: usize,
    pub mean_health_score: f64,
    /// Mean over the records that carry an uptime; 0 when none does.
    pub mean_uptime: f64,
    pub status: MachineStatus,
    pub channels: BTreeMap<SensorChannel, ChannelStats>,
    pub failure_count: usize,
    pub product_counts: BTreeMap<String, usize>,
}

impl WindowAggregate {
    /// Per-channel statistics rounded to two decimals.
    pub fn channel_stats(&self) -> BTreeMap<SensorChannel, ChannelStats> {
        self.channels
            .iter()
            .map(|(&channel, stats)| (channel, stats.rounded(2)))
            .collect()
    }
}

pub fn aggregate_window(window: &[SensorRecord]) -> Result<WindowAggregate, AggregationError> {
    let health_scores: Vec<f64> = window.iter().map(|r| r.health_score).collect();
    let mean_health_score = mean(&health_scores).ok_or(AggregationError::EmptyWindow)?;

    let uptimes: Vec<f64> = window.iter().filter_map(|r| r.uptime).collect();
    let mean_uptime = mean(&uptimes).unwrap_or(0.0);

    let channels = channel_values(window)
        .into_iter()
        .filter_map(|(channel, values)| ChannelStats::from_values(&values).map(|s| (channel, s)))
        .collect();

    let mut product_counts = BTreeMap::new();
    for record in window {
        *product_counts.entry(record.product_type.clone()).or_insert(0) += 1;
    }

    Ok(WindowAggregate {
        record_count: window.len(),
        mean_health_score,
        mean_uptime,
        status: MachineStatus::classify(mean_health_score),
        channels,
        failure_count: window.iter().filter(|r| r.failed).count(),
        product_counts,
    })
}
