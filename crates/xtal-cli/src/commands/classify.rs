use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xtalclass::core::io::parse_structure;
use xtalclass::engine::progress::ProgressReporter;
use xtalclass::workflows::classify::InterfaceClassifier;

/// Classifies one structure and writes the report to `out`.
pub fn run(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    info!("Loading structure from {:?}", &config.structure);
    let (structure, summary) =
        parse_structure(&config.structure).map_err(|source| CliError::Structure {
            path: config.structure.clone(),
            source,
        })?;
    info!(
        chains = summary.chain_count,
        residues = summary.residue_count,
        "Structure loaded."
    );
    if summary.has_gaps() {
        warn!(
            fragments = summary.fragments.len(),
            chains = summary.chain_count,
            "Structure has chain breaks."
        );
    }

    let progress_handler = (!config.quiet).then(CliProgressHandler::new);
    let reporter = match &progress_handler {
        Some(handler) => ProgressReporter::with_callback(handler.get_callback()),
        None => ProgressReporter::new(),
    };

    let mut classifier = InterfaceClassifier::new(&structure, config.selection.clone());
    classifier.predict(&config.classifier, &config.predictor, &reporter)?;

    if config.contact_list {
        let path = contact_list_path(&config.structure);
        info!("Writing contact list to {:?}", &path);
        let mut writer = BufWriter::new(File::create(&path)?);
        classifier.write_contacts(&mut writer)?;
        writer.flush()?;
    }

    if config.quiet {
        writeln!(out, "{}", classifier.summary_line()?)?;
    } else {
        for line in classifier.report()? {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn contact_list_path(structure: &Path) -> PathBuf {
    structure.with_extension("ic")
}
