use super::features::FeatureVector;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Maximum deviation from 1.0 tolerated for the sum of the two probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Failed to start predictor '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Predictor '{}' exited with code {status:?}: {stderr}", program.display())]
    ExitStatus {
        program: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Could not read two class probabilities from predictor output '{line}'")]
    MalformedOutput { line: String },

    #[error("Class probabilities {p_bio} and {p_xtal} are not a valid distribution")]
    InvalidProbabilities { p_bio: f64, p_xtal: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InterfaceClass {
    #[serde(rename = "BIO")]
    Biological,
    #[serde(rename = "XTAL")]
    Crystallographic,
}

impl InterfaceClass {
    pub fn code(self) -> &'static str {
        match self {
            InterfaceClass::Biological => "BIO",
            InterfaceClass::Crystallographic => "XTAL",
        }
    }
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: InterfaceClass,
    /// Probabilities of the biological and crystallographic classes.
    pub probabilities: [f64; 2],
}

impl Prediction {
    /// Picks the most probable class; a tie resolves to [`InterfaceClass::Biological`].
    pub fn from_probabilities(probabilities: [f64; 2]) -> Result<Self, PredictorError> {
        let [p_bio, p_xtal] = probabilities;
        let in_range = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_range(p_bio) || !in_range(p_xtal) || (p_bio + p_xtal - 1.0).abs() > PROBABILITY_TOLERANCE
        {
            return Err(PredictorError::InvalidProbabilities { p_bio, p_xtal });
        }
        let class = if p_bio >= p_xtal {
            InterfaceClass::Biological
        } else {
            InterfaceClass::Crystallographic
        };
        Ok(Self {
            class,
            probabilities,
        })
    }
}

/// A trained model returning `[p_bio, p_xtal]` for a feature vector.
pub trait Predictor {
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictorError>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> Result<[f64; 2], PredictorError>,
{
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictorError> {
        self(features)
    }
}

/// Runs an external program with the 22 features as positional arguments
/// and reads `[LABEL] p_bio p_xtal` from the first line of its stdout.
#[derive(Debug, Clone)]
pub struct CommandPredictor {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandPredictor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the features, e.g. a script path for an interpreter.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl Predictor for CommandPredictor {
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictorError> {
        debug!(program = %self.program.display(), features = %features, "Running predictor.");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(features.to_args())
            .output()
            .map_err(|source| PredictorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PredictorError::ExitStatus {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_probabilities(stdout.lines().next().unwrap_or_default())
    }
}

/// Parses `p_bio p_xtal`, optionally preceded by a class label.
pub fn parse_probabilities(line: &str) -> Result<[f64; 2], PredictorError> {
    let malformed = || PredictorError::MalformedOutput {
        line: line.trim().to_string(),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let numbers = match tokens.as_slice() {
        [label, a, b] if label.parse::<f64>().is_err() => [*a, *b],
        [a, b] => [*a, *b],
        _ => return Err(malformed()),
    };
    let p_bio = numbers[0].parse::<f64>().map_err(|_| malformed())?;
    let p_xtal = numbers[1].parse::<f64>().map_err(|_| malformed())?;
    Ok([p_bio, p_xtal])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify::BinTable;
    use crate::engine::features::build_feature_vector;

    #[test]
    fn argmax_picks_the_larger_probability() {
        let bio = Prediction::from_probabilities([0.804, 0.196]).unwrap();
        assert_eq!(bio.class, InterfaceClass::Biological);
        let xtal = Prediction::from_probabilities([0.3, 0.7]).unwrap();
        assert_eq!(xtal.class, InterfaceClass::Crystallographic);
        assert_eq!(xtal.class.to_string(), "XTAL");
    }

    #[test]
    fn ties_resolve_to_biological() {
        let tie = Prediction::from_probabilities([0.5, 0.5]).unwrap();
        assert_eq!(tie.class, InterfaceClass::Biological);
    }

    #[test]
    fn probabilities_must_form_a_distribution() {
        for bad in [[0.6, 0.6], [-0.1, 1.1], [f64::NAN, 0.5], [0.5, 0.4]] {
            assert!(matches!(
                Prediction::from_probabilities(bad),
                Err(PredictorError::InvalidProbabilities { .. })
            ));
        }
        assert!(Prediction::from_probabilities([0.3333333, 0.6666667]).is_ok());
    }

    #[test]
    fn parses_labelled_and_bare_output() {
        assert_eq!(parse_probabilities("BIO 0.804 0.196\n").unwrap(), [0.804, 0.196]);
        assert_eq!(parse_probabilities("0.25 0.75").unwrap(), [0.25, 0.75]);
    }

    #[test]
    fn rejects_malformed_output() {
        for line in ["", "BIO", "BIO 0.8", "0.1 0.2 0.3", "BIO x y"] {
            let err = parse_probabilities(line).unwrap_err();
            assert!(matches!(err, PredictorError::MalformedOutput { .. }), "{line}");
        }
    }

    #[test]
    fn closures_act_as_predictors() {
        let stub = |_: &FeatureVector| -> Result<[f64; 2], PredictorError> { Ok([0.804, 0.196]) };
        let features = build_feature_vector(&BinTable::default(), 0.5);
        assert_eq!(stub.predict_proba(&features).unwrap(), [0.804, 0.196]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let predictor = CommandPredictor::new("/nonexistent/classify");
        let features = build_feature_vector(&BinTable::default(), 0.5);
        assert!(matches!(
            predictor.predict_proba(&features),
            Err(PredictorError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_receives_features_as_arguments() {
        // The script only answers BIO when it sees all 22 features.
        let predictor = CommandPredictor::new("sh").with_args([
            "-c",
            "if [ $# -eq 22 ]; then echo \"BIO 0.9 0.1\"; else echo \"XTAL 0 1\"; fi",
            "predictor",
        ]);
        let features = build_feature_vector(&BinTable::default(), 0.5);
        assert_eq!(predictor.predict_proba(&features).unwrap(), [0.9, 0.1]);
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let predictor = CommandPredictor::new("sh").with_args(["-c", "echo broken >&2; exit 2"]);
        let features = build_feature_vector(&BinTable::default(), 0.5);
        let err = predictor.predict_proba(&features).unwrap_err();
        assert!(matches!(
            err,
            PredictorError::ExitStatus { status: Some(2), ref stderr, .. } if stderr == "broken"
        ));
    }
}
