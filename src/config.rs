use crate::dosage::AllelePolicy;
use crate::error::{PrsError, PrsResult};

pub const DEFAULT_P_THRESHOLD: f64 = 1e-2;

/// Parameters of a single scoring run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreConfig {
    p_threshold: f64,
    allele_policy: AllelePolicy,
}

impl ScoreConfig {
    pub fn p_threshold(&self) -> f64 {
        self.p_threshold
    }

    pub fn allele_policy(&self) -> AllelePolicy {
        self.allele_policy
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            p_threshold: DEFAULT_P_THRESHOLD,
            allele_policy: AllelePolicy::default(),
        }
    }
}

/// Fails unless `threshold` is a number in `[0, 1]`.
pub fn validate_threshold(threshold: f64) -> PrsResult<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PrsError::InvalidThreshold(threshold))
    }
}

pub struct ScoreConfigBuilder {
    p_threshold: f64,
    allele_policy: AllelePolicy,
}

impl ScoreConfigBuilder {
    /// Construct a new builder holding the default configuration
    pub fn new() -> Self {
        let defaults = ScoreConfig::default();
        Self {
            p_threshold: defaults.p_threshold,
            allele_policy: defaults.allele_policy,
        }
    }

    pub fn p_threshold(&mut self, p_threshold: f64) -> &mut Self {
        self.p_threshold = p_threshold;
        self
    }

    pub fn allele_policy(&mut self, allele_policy: AllelePolicy) -> &mut Self {
        self.allele_policy = allele_policy;
        self
    }

    pub fn build(&self) -> PrsResult<ScoreConfig> {
        Ok(ScoreConfig {
            p_threshold: validate_threshold(self.p_threshold)?,
            allele_policy: self.allele_policy,
        })
    }
}

impl Default for ScoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_default_config() -> Result<(), Box<dyn Error>> {
        let config = ScoreConfigBuilder::new().build()?;
        assert_eq!(config, ScoreConfig::default());
        assert_eq!(config.p_threshold(), 1e-2);
        assert_eq!(config.allele_policy(), AllelePolicy::Nucleotide);
        Ok(())
    }

    #[test]
    fn test_builder_overrides() -> Result<(), Box<dyn Error>> {
        let config = ScoreConfigBuilder::new()
            .p_threshold(5e-8)
            .allele_policy(AllelePolicy::AnyChar)
            .build()?;
        assert_eq!(config.p_threshold(), 5e-8);
        assert_eq!(config.allele_policy(), AllelePolicy::AnyChar);
        Ok(())
    }

    #[test]
    fn test_threshold_out_of_range_fails() {
        for threshold in [-0.1, 1.5, std::f64::NAN].iter() {
            let result = ScoreConfigBuilder::new().p_threshold(*threshold).build();
            assert!(matches!(result, Err(PrsError::InvalidThreshold(_))));
        }
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
    }
}
