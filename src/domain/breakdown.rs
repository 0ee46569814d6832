// Per-product-type breakdown over a machine's full history
use super::aggregate::{channel_values, mean, round_to};
use super::record::{SensorChannel, SensorRecord};
use std::collections::BTreeMap;

/// Figures for one product type, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductTypeStats {
    pub count: usize,
    /// Percentage of records flagged as failed.
    pub failure_rate: f64,
    pub avg_health_score: f64,
    pub channel_means: BTreeMap<SensorChannel, f64>,
}

/// Product types are keyed alphabetically. An empty history yields an empty
/// breakdown rather than an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductBreakdown {
    pub by_type: BTreeMap<String, ProductTypeStats>,
}

impl ProductBreakdown {
    pub fn compute(records: &[SensorRecord]) -> Self {
        let mut groups: BTreeMap<&str, Vec<&SensorRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.product_type.as_str()).or_default().push(record);
        }

        let by_type = groups
            .into_iter()
            .map(|(product_type, group)| (product_type.to_string(), Self::stats_for(&group)))
            .collect();

        Self { by_type }
    }

    fn stats_for(group: &[&SensorRecord]) -> ProductTypeStats {
        let count = group.len();
        let failed = group.iter().filter(|r| r.failed).count();
        let health_scores: Vec<f64> = group.iter().map(|r| r.health_score).collect();

        let channel_means = channel_values(group.iter().copied())
            .into_iter()
            .filter_map(|(channel, values)| mean(&values).map(|m| (channel, round_to(m, 2))))
            .collect();

        ProductTypeStats {
            count,
            failure_rate: round_to(100.0 * failed as f64 / count as f64, 2),
            avg_health_score: round_to(mean(&health_scores).unwrap_or(0.0), 2),
            channel_means,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.by_type
            .iter()
            .map(|(product_type, stats)| (product_type.clone(), stats.count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::fixtures::record;

    #[test]
    fn test_empty_history_yields_empty_breakdown() {
        let breakdown = ProductBreakdown::compute(&[]);
        assert!(breakdown.is_empty());
        assert!(breakdown.counts().is_empty());
    }

    #[test]
    fn test_single_record() {
        let mut only = record(3, 0, 73.456);
        only.failed = true;
        let breakdown = ProductBreakdown::compute(&[only]);

        let stats = &breakdown.by_type["L"];
        assert_eq!(stats.count, 1);
        assert_eq!(stats.failure_rate, 100.0);
        assert_eq!(stats.avg_health_score, 73.46);

        let healthy = ProductBreakdown::compute(&[record(3, 0, 90.0)]);
        assert_eq!(healthy.by_type["L"].failure_rate, 0.0);
    }

    #[test]
    fn test_half_scores_round_to_even() {
        let breakdown = ProductBreakdown::compute(&[record(2, 0, 73.125)]);
        assert_eq!(breakdown.by_type["L"].avg_health_score, 73.12);
    }

    #[test]
    fn test_history_is_left_intact() {
        let history = vec![record(1, 0, 80.0), record(1, 1, 60.0)];
        let breakdown = ProductBreakdown::compute(&history);
        assert_eq!(breakdown.by_type["L"].count, history.len());
        assert_eq!(history[1].health_score, 60.0);
    }

    #[test]
    fn test_groups_by_product_type() {
        let mut records: Vec<_> = (0..3).map(|i| record(1, i, 80.0 + i as f64)).collect();
        records[1].failed = true;
        for i in 3..5 {
            let mut r = record(1, i, 60.0);
            r.product_type = "M".to_string();
            r.tool_wear = 10.0 * i as f64;
            r.vibration = Some(5.0);
            records.push(r);
        }

        let breakdown = ProductBreakdown::compute(&records);
        assert_eq!(breakdown.by_type.keys().collect::<Vec<_>>(), vec!["L", "M"]);

        let low = &breakdown.by_type["L"];
        assert_eq!(low.count, 3);
        assert_eq!(low.failure_rate, 33.33);
        assert_eq!(low.avg_health_score, 81.0);
        assert!(!low.channel_means.contains_key(&SensorChannel::Vibration));

        let medium = &breakdown.by_type["M"];
        assert_eq!(medium.count, 2);
        assert_eq!(medium.failure_rate, 0.0);
        assert_eq!(medium.channel_means[&SensorChannel::ToolWear], 35.0);
        assert_eq!(medium.channel_means[&SensorChannel::Vibration], 5.0);

        assert_eq!(breakdown.counts().get("M"), Some(&2));
    }
}
