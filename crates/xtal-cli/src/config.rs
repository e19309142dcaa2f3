use crate::cli::{Cli, PREDICTOR_ENV};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use xtalclass::engine::config::{ClassifierConfig, ClassifierConfigBuilder, DEFAULT_DISTANCE_CUTOFF};
use xtalclass::engine::predictor::CommandPredictor;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialContactsConfig {
    #[serde(rename = "distance-cutoff")]
    distance_cutoff: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPredictorConfig {
    command: Option<PathBuf>,
    #[serde(default)]
    args: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    contacts: Option<PartialContactsConfig>,
    predictor: Option<PartialPredictorConfig>,
}

/// Everything a classification run needs, after merging file and CLI values.
#[derive(Debug)]
pub struct AppConfig {
    pub structure: PathBuf,
    pub selection: Option<Vec<String>>,
    pub contact_list: bool,
    pub quiet: bool,
    pub classifier: ClassifierConfig,
    pub predictor: CommandPredictor,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Command-line values win over file values, which win over defaults.
    pub fn merge_with_cli(self, args: &Cli) -> Result<AppConfig> {
        let contacts = self.contacts.unwrap_or_default();
        let predictor = self.predictor.unwrap_or_default();

        let cutoff = args
            .cutoff
            .or(contacts.distance_cutoff)
            .unwrap_or(DEFAULT_DISTANCE_CUTOFF);
        let classifier = ClassifierConfigBuilder::new()
            .distance_cutoff(cutoff)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        // A program given on the command line replaces the file's command and its arguments.
        let predictor = match (&args.predictor, predictor.command) {
            (Some(program), _) => CommandPredictor::new(program),
            (None, Some(program)) => CommandPredictor::new(program).with_args(predictor.args),
            (None, None) => {
                return Err(CliError::Config(format!(
                    "No predictor configured. Pass --predictor, set {} or add `[predictor] command` to the config file.",
                    PREDICTOR_ENV
                )));
            }
        };

        let selection = (!args.selection.is_empty()).then(|| args.selection.clone());

        Ok(AppConfig {
            structure: args.structure.clone(),
            selection,
            contact_list: args.contact_list,
            quiet: args.quiet,
            classifier,
            predictor,
        })
    }
}

/// Loads the optional config file named on the command line and merges it.
pub fn build_config(args: &Cli) -> Result<AppConfig> {
    let partial = match &args.config {
        Some(path) => PartialConfig::from_file(path)?,
        None => PartialConfig::default(),
    };
    partial.merge_with_cli(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["xtal-classify", "complex.pdb"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = PartialConfig::default()
            .merge_with_cli(&cli(&["--predictor", "/opt/model/predict"]))
            .unwrap();
        assert_eq!(config.classifier.distance_cutoff, DEFAULT_DISTANCE_CUTOFF);
        assert_eq!(config.predictor.program(), Path::new("/opt/model/predict"));
        assert_eq!(config.selection, None);
        assert!(!config.contact_list);
    }

    #[test]
    fn file_values_fill_missing_arguments() {
        let partial = PartialConfig::from_toml(
            r#"
            [contacts]
            distance-cutoff = 4.5

            [predictor]
            command = "python3"
            args = ["predict.py"]
            "#,
        )
        .unwrap();
        let config = partial.merge_with_cli(&cli(&["--selection", "A,B", "C"])).unwrap();
        assert_eq!(config.classifier.distance_cutoff, 4.5);
        assert_eq!(config.predictor.program(), Path::new("python3"));
        assert_eq!(config.selection, Some(vec!["A,B".to_string(), "C".to_string()]));
    }

    #[test]
    fn command_line_overrides_file() {
        let partial = PartialConfig::from_toml(
            r#"
            [contacts]
            distance-cutoff = 4.5
            [predictor]
            command = "python3"
            "#,
        )
        .unwrap();
        let config = partial
            .merge_with_cli(&cli(&["--cutoff", "6.0", "--predictor", "./predict"]))
            .unwrap();
        assert_eq!(config.classifier.distance_cutoff, 6.0);
        assert_eq!(config.predictor.program(), Path::new("./predict"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PartialConfig::from_toml("[contacts]\ncutoff = 5.0\n").is_err());
        assert!(PartialConfig::from_toml("[sasa]\nbinary = \"freesasa\"\n").is_err());
    }

    #[test]
    fn invalid_cutoff_is_a_configuration_error() {
        let result = PartialConfig::default()
            .merge_with_cli(&cli(&["--cutoff=-1", "--predictor", "p"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[contacts\ndistance-cutoff = ").unwrap();
        let err = PartialConfig::from_file(file.path()).unwrap_err();
        match err {
            CliError::FileParsing { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
