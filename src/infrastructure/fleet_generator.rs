// Synthetic fleet generator - deterministic lathe histories for seeding
use crate::domain::aggregate::mean;
use crate::domain::health_model::HealthModel;
use crate::domain::record::SensorRecord;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

const PRODUCT_TYPES: [&str; 3] = ["L", "M", "H"];
const NOISE_FRACTION: f64 = 0.05;

/// Operating condition a lathe's history is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    VeryGood,
    Good,
    Ok,
    VeryBad,
}

struct Shift {
    air_temperature: f64,
    process_temperature: f64,
    speed_factor: f64,
    torque_factor: f64,
    wear_factor: f64,
}

/// Skew-normal shape per channel: air, process, speed, torque, wear.
type Skew = [f64; 5];

impl Condition {
    pub const ALL: [Condition; 4] = [Condition::VeryGood, Condition::Good, Condition::Ok, Condition::VeryBad];

    pub fn machine_id(self) -> i64 {
        match self {
            Condition::VeryGood => 1,
            Condition::Ok => 2,
            Condition::Good => 3,
            Condition::VeryBad => 4,
        }
    }

    fn shift(self) -> Shift {
        let (air_temperature, process_temperature, factor, wear_factor) = match self {
            Condition::VeryGood => (-3.0, -2.0, 1.05, 0.90),
            Condition::Good => (0.0, 0.0, 1.00, 1.00),
            Condition::Ok => (3.0, 2.0, 0.95, 1.10),
            Condition::VeryBad => (6.0, 4.0, 0.90, 1.20),
        };
        Shift {
            air_temperature,
            process_temperature,
            speed_factor: factor,
            torque_factor: factor,
            wear_factor,
        }
    }

    fn skew(self) -> Skew {
        match self {
            Condition::VeryGood => [-4.0, -3.0, 4.0, 3.0, -5.0],
            Condition::Good => [0.0; 5],
            Condition::Ok => [2.0, 2.0, -2.0, -2.0, 2.0],
            Condition::VeryBad => [5.0, 4.0, -5.0, -4.0, 6.0],
        }
    }
}

#[derive(Debug, Clone)]
struct BaseSample {
    channels: [f64; 5],
    product_type: &'static str,
}

pub struct FleetGenerator {
    rng: StdRng,
    standard: Normal,
}

impl FleetGenerator {
    pub fn new(seed: u64) -> anyhow::Result<Self> {
        let standard = Normal::new(0.0, 1.0).context("Failed to build standard normal distribution")?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            standard,
        })
    }

    /// One history per condition, newest record stamped `now`, one hour apart.
    pub fn generate(&mut self, records_per_machine: usize, now: DateTime<Utc>) -> Vec<(i64, Vec<SensorRecord>)> {
        let base = self.base_samples(records_per_machine);
        if base.is_empty() {
            return Condition::ALL.iter().map(|c| (c.machine_id(), Vec::new())).collect();
        }

        let column = |i: usize| base.iter().map(|s| s.channels[i]).collect::<Vec<_>>();
        let model = HealthModel::new(
            mean(&column(2)).unwrap_or(0.0),
            mean(&column(3)).unwrap_or(0.0),
            column(4).into_iter().fold(f64::NEG_INFINITY, f64::max),
        );
        let stds: Vec<f64> = (0..5).map(|i| sample_std(&column(i))).collect();

        Condition::ALL
            .iter()
            .map(|&condition| {
                let records = self.build(condition, &base, &stds, &model, now);
                (condition.machine_id(), records)
            })
            .collect()
    }

    fn base_samples(&mut self, n: usize) -> Vec<BaseSample> {
        (0..n)
            .map(|_| {
                let air = 300.0 + 5.0 * self.standard_normal();
                let speed = 1500.0 + 100.0 * self.standard_normal();
                let wear = self.rng.gen_range(0.0..200.0);
                let process = air + 10.0 + 2.0 * self.standard_normal();
                let torque = 0.02 * speed + 5.0 * self.standard_normal();
                let product_type = PRODUCT_TYPES[self.rng.gen_range(0..PRODUCT_TYPES.len())];
                BaseSample {
                    channels: [air, process, speed, torque, wear],
                    product_type,
                }
            })
            .collect()
    }

    fn build(
        &mut self,
        condition: Condition,
        base: &[BaseSample],
        stds: &[f64],
        model: &HealthModel,
        now: DateTime<Utc>,
    ) -> Vec<SensorRecord> {
        let shift = condition.shift();
        let skew = condition.skew();

        let shifted: Vec<[f64; 5]> = base
            .iter()
            .map(|sample| {
                let [air, process, speed, torque, wear] = sample.channels;
                let mut channels = [
                    air + shift.air_temperature,
                    process + shift.process_temperature,
                    speed * shift.speed_factor,
                    torque * shift.torque_factor,
                    wear * shift.wear_factor,
                ];
                for (i, value) in channels.iter_mut().enumerate() {
                    *value += stds[i] * NOISE_FRACTION * self.skew_normal(skew[i]);
                }
                channels
            })
            .collect();

        let vibration_raw: Vec<f64> = shifted
            .iter()
            .map(|c| 0.6 * c[3] + 0.4 * c[4] + 2.0 * self.standard_normal())
            .collect();
        let vibration_min = vibration_raw.iter().copied().fold(f64::INFINITY, f64::min);
        let vibration_max = vibration_raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let vibration_span = vibration_max - vibration_min;

        shifted
            .iter()
            .zip(base)
            .zip(vibration_raw)
            .enumerate()
            .map(|(i, ((channels, sample), vibration))| {
                let [air, process, speed, torque, wear] = *channels;
                let health_score = model.score(air, speed, torque, wear);
                let failed = self.rng.gen_bool(model.failure_probability(health_score).clamp(0.0, 1.0));
                let jitter = self.rng.gen_range(0.0..20.0);

                SensorRecord {
                    machine_id: condition.machine_id(),
                    timestamp: now - Duration::hours(i as i64),
                    air_temperature: air,
                    process_temperature: process,
                    rotational_speed: speed,
                    torque,
                    tool_wear: wear,
                    vibration: Some(if vibration_span > 0.0 {
                        100.0 * (vibration - vibration_min) / vibration_span
                    } else {
                        0.0
                    }),
                    product_type: sample.product_type.to_string(),
                    failed,
                    health_score,
                    uptime: Some(model.uptime(failed, jitter)),
                }
            })
            .collect()
    }

    /// Draw from N(0, 1)
    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(&self.standard)
    }

    /// Skew-normal draw with shape `a` (a > 0 skews right), built from two
    /// independent standard normal draws
    fn skew_normal(&mut self, a: f64) -> f64 {
        let delta = a / (1.0 + a * a).sqrt();
        let u0 = self.standard_normal();
        let v = self.standard_normal();
        let u1 = delta * u0 + (1.0 - delta * delta).sqrt() * v;
        if u0 >= 0.0 { u1 } else { -u1 }
    }
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values).unwrap_or(0.0);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
