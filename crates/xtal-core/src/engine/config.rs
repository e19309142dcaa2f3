use thiserror::Error;

/// Residue-residue contact cutoff, in Å, used when none is configured.
pub const DEFAULT_DISTANCE_CUTOFF: f64 = 5.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Chain '{chain}' is listed in more than one selection group")]
    DuplicateChain { chain: String },

    #[error("Selection group {index} does not contain any chain")]
    EmptyGroup { index: usize },

    #[error("Distance cutoff must be a positive, finite number of Ångströms (got {0})")]
    InvalidCutoff(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub distance_cutoff: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            distance_cutoff: DEFAULT_DISTANCE_CUTOFF,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.distance_cutoff.is_finite() && self.distance_cutoff > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidCutoff(self.distance_cutoff))
        }
    }
}

#[derive(Default)]
pub struct ClassifierConfigBuilder {
    distance_cutoff: Option<f64>,
}

impl ClassifierConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_cutoff(mut self, cutoff: f64) -> Self {
        self.distance_cutoff = Some(cutoff);
        self
    }

    pub fn build(self) -> Result<ClassifierConfig, ConfigError> {
        let config = ClassifierConfig {
            distance_cutoff: self
                .distance_cutoff
                .ok_or(ConfigError::MissingParameter("distance_cutoff"))?,
        };
        config.validate()?;
        Ok(config)
    }
}
