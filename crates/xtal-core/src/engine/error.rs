use thiserror::Error;

use super::config::ConfigError;
use super::predictor::PredictorError;

/// Broad failure classes, used by callers to phrase diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Geometry,
    Collaborator,
    Internal,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No contacts found for selection")]
    NoContacts,

    #[error("Link density is undefined for an empty contact list")]
    UndefinedLinkDensity,

    #[error("Residue {name} (chain {chain}, residue {number}) has no known physicochemical character")]
    UnknownResidue {
        name: String,
        chain: String,
        number: isize,
    },

    #[error("Predictor failed: {0}")]
    Predictor(#[from] PredictorError),

    #[error("Results were requested before the interface was evaluated")]
    NotEvaluated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::Config(_) => ErrorCategory::Configuration,
            EngineError::NoContacts | EngineError::UndefinedLinkDensity => ErrorCategory::Geometry,
            EngineError::UnknownResidue { .. } | EngineError::Io(_) => ErrorCategory::Input,
            EngineError::Predictor(_) => ErrorCategory::Collaborator,
            EngineError::NotEvaluated | EngineError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_their_category() {
        let duplicate = EngineError::from(ConfigError::DuplicateChain { chain: "B".into() });
        assert_eq!(duplicate.category(), ErrorCategory::Configuration);
        assert!(duplicate.to_string().contains("'B'"));

        assert_eq!(EngineError::NoContacts.category(), ErrorCategory::Geometry);
        assert_eq!(EngineError::UndefinedLinkDensity.category(), ErrorCategory::Geometry);
        assert_eq!(
            EngineError::UnknownResidue {
                name: "MSE".into(),
                chain: "A".into(),
                number: 3
            }
            .category(),
            ErrorCategory::Input
        );
        let spawn = PredictorError::MalformedOutput { line: "nan".into() };
        assert_eq!(EngineError::from(spawn).category(), ErrorCategory::Collaborator);
        assert_eq!(EngineError::NotEvaluated.category(), ErrorCategory::Internal);
    }
}
