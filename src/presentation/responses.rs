// Mappers from domain views to JSON response bodies
use crate::domain::aggregate::ChannelStats;
use crate::domain::breakdown::ProductBreakdown;
use crate::domain::machine::{MachineDetail, MachineSummary, ProductAnalysis, SensorReport};
use crate::domain::record::SensorChannel;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct LatheSummaryResponse {
    pub lathe_id: i64,
    pub name: String,
    pub health_score: f64,
    pub uptime: f64,
    pub status: &'static str,
}

impl From<MachineSummary> for LatheSummaryResponse {
    fn from(summary: MachineSummary) -> Self {
        Self {
            lathe_id: summary.lathe.id,
            name: summary.lathe.name,
            health_score: summary.health_score,
            uptime: summary.uptime,
            status: summary.status.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LatheDetailsResponse {
    #[serde(flatten)]
    pub summary: LatheSummaryResponse,
    /// Channel means by channel key; vibration is left out when never observed.
    #[serde(flatten)]
    pub channels: BTreeMap<&'static str, f64>,
    pub failure_count: usize,
    pub product_types: BTreeMap<String, usize>,
}

impl From<MachineDetail> for LatheDetailsResponse {
    fn from(detail: MachineDetail) -> Self {
        Self {
            summary: detail.summary.into(),
            channels: keyed(detail.channel_means),
            failure_count: detail.failure_count,
            product_types: detail.product_types,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl From<ChannelStats> for StatsResponse {
    fn from(stats: ChannelStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            avg: stats.mean,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SensorDataResponse {
    pub lathe_id: i64,
    pub name: String,
    pub sensor_data: BTreeMap<&'static str, Vec<f64>>,
    pub stats: BTreeMap<&'static str, StatsResponse>,
}

impl From<SensorReport> for SensorDataResponse {
    fn from(report: SensorReport) -> Self {
        Self {
            lathe_id: report.lathe.id,
            name: report.lathe.name,
            sensor_data: keyed(report.values),
            stats: report
                .stats
                .into_iter()
                .map(|(channel, stats)| (channel.key(), stats.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductQualityResponse {
    pub count: usize,
    pub failure_rate: f64,
    pub avg_health_score: f64,
}

#[derive(Debug, Serialize)]
pub struct ProductAnalysisResponse {
    pub lathe_id: i64,
    pub name: String,
    pub product_types: BTreeMap<String, usize>,
    pub product_quality: BTreeMap<String, ProductQualityResponse>,
    pub params_by_type: BTreeMap<String, BTreeMap<&'static str, f64>>,
}

impl From<ProductAnalysis> for ProductAnalysisResponse {
    fn from(analysis: ProductAnalysis) -> Self {
        let product_types = analysis.breakdown.counts();
        let ProductBreakdown { by_type } = analysis.breakdown;

        let mut product_quality = BTreeMap::new();
        let mut params_by_type = BTreeMap::new();
        for (product_type, stats) in by_type {
            product_quality.insert(
                product_type.clone(),
                ProductQualityResponse {
                    count: stats.count,
                    failure_rate: stats.failure_rate,
                    avg_health_score: stats.avg_health_score,
                },
            );
            params_by_type.insert(product_type, keyed(stats.channel_means));
        }

        Self {
            lathe_id: analysis.lathe.id,
            name: analysis.lathe.name,
            product_types,
            product_quality,
            params_by_type,
        }
    }
}

fn keyed<V>(by_channel: BTreeMap<SensorChannel, V>) -> BTreeMap<&'static str, V> {
    by_channel
        .into_iter()
        .map(|(channel, value)| (channel.key(), value))
        .collect()
}
