use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tunables for the simulation step.
///
/// Defaults reproduce the classic demo: gravity 0.2 px/tick², squeeze to
/// 0.8 for 10 ticks, relax 20% per tick, split movable contacts 50/50.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Acceleration given to dynamic bodies that do not specify their own.
    pub gravity: Vec2,
    /// Squeeze factor applied on every resolved contact.
    pub squeeze_impact: f32,
    /// Ticks the squeeze relaxes for before snapping back to 1.0.
    pub squeeze_ticks: u32,
    /// Fraction of the remaining distance to 1.0 recovered each tick.
    pub squeeze_relax: f32,
    /// Share of the penetration a body takes when the obstacle is movable.
    pub pair_split: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 0.2),
            squeeze_impact: 0.8,
            squeeze_ticks: 10,
            squeeze_relax: 0.2,
            pair_split: 0.5,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("gravity must be finite, got {0:?}")]
    NonFiniteGravity(Vec2),
    #[error("squeeze_impact must be in (0, 1], got {0}")]
    SqueezeImpact(f32),
    #[error("squeeze_relax must be in [0, 1], got {0}")]
    SqueezeRelax(f32),
    #[error("pair_split must be in (0, 1], got {0}")]
    PairSplit(f32),
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity(self.gravity));
        }
        if !(self.squeeze_impact > 0.0 && self.squeeze_impact <= 1.0) {
            return Err(ConfigError::SqueezeImpact(self.squeeze_impact));
        }
        if !(0.0..=1.0).contains(&self.squeeze_relax) {
            return Err(ConfigError::SqueezeRelax(self.squeeze_relax));
        }
        if !(self.pair_split > 0.0 && self.pair_split <= 1.0) {
            return Err(ConfigError::PairSplit(self.pair_split));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad = SimConfig {
            squeeze_impact: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::SqueezeImpact(0.0)));

        let bad = SimConfig {
            squeeze_relax: 1.5,
            ..SimConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::SqueezeRelax(1.5)));

        let bad = SimConfig {
            pair_split: f32::NAN,
            ..SimConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::PairSplit(_))));

        let bad = SimConfig {
            gravity: Vec2::new(0.0, f32::INFINITY),
            ..SimConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::NonFiniteGravity(_))
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "squeeze_ticks": 4 }"#).unwrap();
        assert_eq!(config.squeeze_ticks, 4);
        assert_eq!(config.squeeze_impact, 0.8);
        assert_eq!(config.gravity, Vec2::new(0.0, 0.2));
    }
}
