// Synthetic health score model used when generating fleet data
//
// Scores are computed once at generation time and stored on each record;
// the serving path only averages them.

pub const NOMINAL_AIR_TEMPERATURE: f64 = 300.0;
pub const TEMPERATURE_SHIFT: f64 = 10.0;

const WEIGHT_TEMPERATURE: f64 = 0.2;
const WEIGHT_SPEED: f64 = 0.25;
const WEIGHT_TORQUE: f64 = 0.25;
const WEIGHT_WEAR: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthModel {
    pub nominal_speed: f64,
    pub nominal_torque: f64,
    pub max_tool_wear: f64,
}

impl HealthModel {
    pub fn new(nominal_speed: f64, nominal_torque: f64, max_tool_wear: f64) -> Self {
        Self {
            nominal_speed,
            nominal_torque,
            max_tool_wear,
        }
    }

    /// Weighted health score in [0, 100].
    pub fn score(&self, air_temperature: f64, rotational_speed: f64, torque: f64, tool_wear: f64) -> f64 {
        let temperature =
            1.0 - ((air_temperature - NOMINAL_AIR_TEMPERATURE).abs() / TEMPERATURE_SHIFT).clamp(0.0, 1.0);
        let speed = clip_ratio(rotational_speed, self.nominal_speed);
        let torque = clip_ratio(torque, self.nominal_torque);
        let wear = (1.0 - safe_ratio(tool_wear, self.max_tool_wear)).clamp(0.0, 1.0);

        100.0
            * (WEIGHT_TEMPERATURE * temperature
                + WEIGHT_SPEED * speed
                + WEIGHT_TORQUE * torque
                + WEIGHT_WEAR * wear)
    }

    /// Probability of a failure event; falls as health rises.
    pub fn failure_probability(&self, health_score: f64) -> f64 {
        1.0 - logistic((health_score - 50.0) / 10.0)
    }

    /// Uptime for a record given its failure flag and a jitter drawn from U(0, 20).
    pub fn uptime(&self, failed: bool, jitter: f64) -> f64 {
        let f = if failed { 1.0 } else { 0.0 };
        100.0 - 10.0 * f - jitter * (f * 0.8 + 0.2)
    }
}

fn safe_ratio(value: f64, nominal: f64) -> f64 {
    if nominal > 0.0 { value / nominal } else { 0.0 }
}

fn clip_ratio(value: f64, nominal: f64) -> f64 {
    safe_ratio(value, nominal).clamp(0.0, 1.0)
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> HealthModel {
        HealthModel::new(1500.0, 30.0, 200.0)
    }

    #[test]
    fn test_nominal_conditions_score_full_marks() {
        let score = model().score(300.0, 1500.0, 30.0, 0.0);
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sub_scores_are_clipped() {
        // Overspeed and overtorque cannot push the score above 100.
        let score = model().score(300.0, 3000.0, 90.0, 0.0);
        assert!((score - 100.0).abs() < 1e-9);

        // Fully worn tool far from nominal temperature leaves speed and torque only.
        let score = model().score(320.0, 1500.0, 30.0, 400.0);
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights() {
        // Worn tool only: loses the 0.3 wear weight.
        let score = model().score(300.0, 1500.0, 30.0, 200.0);
        assert!((score - 70.0).abs() < 1e-9);

        // Half speed: loses half of the 0.25 speed weight.
        let score = model().score(300.0, 750.0, 30.0, 0.0);
        assert!((score - 87.5).abs() < 1e-9);
    }

    #[test]
    fn test_failure_probability() {
        let m = model();
        assert!((m.failure_probability(50.0) - 0.5).abs() < 1e-12);
        assert!(m.failure_probability(90.0) < 0.02);
        assert!(m.failure_probability(10.0) > 0.98);
    }

    #[test]
    fn test_uptime() {
        let m = model();
        assert_eq!(m.uptime(false, 0.0), 100.0);
        assert!((m.uptime(false, 20.0) - 96.0).abs() < 1e-9);
        assert!((m.uptime(true, 20.0) - 70.0).abs() < 1e-9);
    }
}
