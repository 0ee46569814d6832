// Machine status classification
use std::fmt;

pub const OPERATIONAL_THRESHOLD: f64 = 80.0;
pub const WARNING_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    Operational,
    Warning,
    Failure,
}

impl MachineStatus {
    /// Classify a mean health score. Thresholds are inclusive on the higher bucket.
    pub fn classify(mean_health_score: f64) -> Self {
        if mean_health_score >= OPERATIONAL_THRESHOLD {
            MachineStatus::Operational
        } else if mean_health_score >= WARNING_THRESHOLD {
            MachineStatus::Warning
        } else {
            MachineStatus::Failure
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MachineStatus::Operational => "Operational",
            MachineStatus::Warning => "Warning",
            MachineStatus::Failure => "Failure",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
