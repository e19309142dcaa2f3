use super::error::IoError;
use super::records::{AtomRecord, IngestSummary, assemble};
use crate::core::models::structure::Structure;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structure file formats.
///
/// Implementors only turn text into [`AtomRecord`]s; the clean-up rules
/// (first model, alternate locations, hetero groups, hydrogens, non-standard
/// residues) are shared by all formats and applied in [`assemble`].
pub trait StructureFile {
    /// Reads every coordinate row from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if a row is malformed or the reader fails.
    fn read_records(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, IoError>;

    /// Reads and assembles a structure named `name` from a buffered reader.
    fn read_from(
        name: &str,
        reader: &mut impl BufRead,
    ) -> Result<(Structure, IngestSummary), IoError> {
        let records = Self::read_records(reader)?;
        assemble(name, records)
    }

    /// Reads a structure from a file path. The structure is named after the
    /// file stem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<(Structure, IngestSummary), IoError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&name, &mut reader)
    }
}
