use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

/// Environment variable consulted when `--predictor` is not given.
pub const PREDICTOR_ENV: &str = "XTAL_PREDICTOR";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Classify the interfaces of a crystal structure as biological (BIO) or crystallographic (XTAL).",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Structure to analyse (.pdb, .ent or .cif).
    #[arg(value_name = "STRUCTURE")]
    pub structure: PathBuf,

    /// Chain groups to treat as separate molecules, e.g. `--selection A,B C`.
    /// Defaults to one molecule per chain.
    #[arg(long, value_name = "CHAINS", num_args(1..))]
    pub selection: Vec<String>,

    /// Write the residue contacts next to the structure with an `.ic` extension.
    #[arg(long, alias = "contact_list")]
    pub contact_list: bool,

    /// Print only a one-line summary and suppress all logs except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Override the residue contact distance cutoff, in Å.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Program that turns the 22 interface features into class probabilities.
    #[arg(long, env = PREDICTOR_ENV, value_name = "CMD")]
    pub predictor: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn selection_tokens_are_kept_as_groups() {
        let cli = Cli::try_parse_from([
            "xtal-classify",
            "1brs.pdb",
            "--selection",
            "A,B",
            "C",
            "--contact-list",
        ])
        .unwrap();
        assert_eq!(cli.structure, PathBuf::from("1brs.pdb"));
        assert_eq!(cli.selection, vec!["A,B", "C"]);
        assert!(cli.contact_list);
        assert!(!cli.quiet);
    }

    #[test]
    fn underscore_contact_list_flag_is_accepted() {
        let cli = Cli::try_parse_from(["xtal-classify", "1brs.pdb", "--contact_list"]).unwrap();
        assert!(cli.contact_list);
    }

    #[test]
    fn quiet_and_verbose_are_exclusive() {
        let result = Cli::try_parse_from(["xtal-classify", "x.pdb", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn structure_is_required() {
        assert!(Cli::try_parse_from(["xtal-classify"]).is_err());
    }
}
