// Sensor record domain model and validation of raw store rows
use chrono::{DateTime, Utc};
use std::fmt;

/// Numeric sensor channels carried by a record.
///
/// `Vibration` is the only optional channel; all others are required for a
/// record to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorChannel {
    AirTemperature,
    ProcessTemperature,
    RotationalSpeed,
    Torque,
    ToolWear,
    Vibration,
}

impl SensorChannel {
    pub const ALL: [SensorChannel; 6] = [
        SensorChannel::AirTemperature,
        SensorChannel::ProcessTemperature,
        SensorChannel::RotationalSpeed,
        SensorChannel::Torque,
        SensorChannel::ToolWear,
        SensorChannel::Vibration,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SensorChannel::AirTemperature => "air_temperature",
            SensorChannel::ProcessTemperature => "process_temperature",
            SensorChannel::RotationalSpeed => "rotational_speed",
            SensorChannel::Torque => "torque",
            SensorChannel::ToolWear => "tool_wear",
            SensorChannel::Vibration => "vibration",
        }
    }

    /// Reading of this channel on `record`, `None` only for an absent vibration.
    pub fn read(self, record: &SensorRecord) -> Option<f64> {
        match self {
            SensorChannel::AirTemperature => Some(record.air_temperature),
            SensorChannel::ProcessTemperature => Some(record.process_temperature),
            SensorChannel::RotationalSpeed => Some(record.rotational_speed),
            SensorChannel::Torque => Some(record.torque),
            SensorChannel::ToolWear => Some(record.tool_wear),
            SensorChannel::Vibration => record.vibration,
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One validated, immutable observation of a lathe.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    pub machine_id: i64,
    pub timestamp: DateTime<Utc>,
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
    pub vibration: Option<f64>,
    pub product_type: String,
    pub failed: bool,
    pub health_score: f64,
    pub uptime: Option<f64>,
}

/// A record as decoded from the store, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub machine_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub air_temperature: Option<f64>,
    pub process_temperature: Option<f64>,
    pub rotational_speed: Option<f64>,
    pub torque: Option<f64>,
    pub tool_wear: Option<f64>,
    pub vibration: Option<f64>,
    pub product_type: Option<String>,
    pub failed: Option<bool>,
    pub health_score: Option<f64>,
    pub uptime: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("field `{field}` must be within [0, 100], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

fn finite(value: f64, field: &'static str) -> Result<f64, RecordError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RecordError::NonFinite { field, value })
    }
}

fn percentage(value: f64, field: &'static str) -> Result<f64, RecordError> {
    let value = finite(value, field)?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(RecordError::OutOfRange { field, value })
    }
}

impl TryFrom<RawRecord> for SensorRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let product_type = required(raw.product_type, "product_type")?;
        if product_type.trim().is_empty() {
            return Err(RecordError::MissingField("product_type"));
        }

        Ok(Self {
            machine_id: required(raw.machine_id, "machine_id")?,
            timestamp: required(raw.timestamp, "timestamp")?,
            air_temperature: finite(required(raw.air_temperature, "air_temperature")?, "air_temperature")?,
            process_temperature: finite(
                required(raw.process_temperature, "process_temperature")?,
                "process_temperature",
            )?,
            rotational_speed: finite(required(raw.rotational_speed, "rotational_speed")?, "rotational_speed")?,
            torque: finite(required(raw.torque, "torque")?, "torque")?,
            tool_wear: finite(required(raw.tool_wear, "tool_wear")?, "tool_wear")?,
            vibration: raw.vibration.map(|v| finite(v, "vibration")).transpose()?,
            product_type,
            failed: required(raw.failed, "failed")?,
            health_score: percentage(required(raw.health_score, "health_score")?, "health_score")?,
            uptime: raw.uptime.map(|u| percentage(u, "uptime")).transpose()?,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// A valid record `hours_ago` hours before a fixed reference time.
    pub fn record(machine_id: i64, hours_ago: i64, health_score: f64) -> SensorRecord {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        SensorRecord {
            machine_id,
            timestamp: base - Duration::hours(hours_ago),
            air_temperature: 300.0,
            process_temperature: 310.0,
            rotational_speed: 1500.0,
            torque: 40.0,
            tool_wear: 100.0,
            vibration: None,
            product_type: "L".to_string(),
            failed: false,
            health_score,
            uptime: Some(90.0),
        }
    }
}
