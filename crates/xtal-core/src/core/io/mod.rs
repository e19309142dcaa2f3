//! Reading and writing macromolecular structure files.
//!
//! Both PDB and PDBx/mmCIF are supported. Each format turns text into
//! format-independent [`records::AtomRecord`]s, and [`records::assemble`]
//! applies the shared clean-up rules to build a [`Structure`].

pub mod error;
pub mod mmcif;
pub mod pdb;
pub mod records;
pub mod traits;

use crate::core::models::structure::Structure;
use error::IoError;
use mmcif::MmcifFile;
use pdb::PdbFile;
use records::IngestSummary;
use std::path::Path;
use traits::StructureFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Pdb,
    Mmcif,
}

impl StructureFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdb" | "ent" => Ok(Self::Pdb),
            "cif" => Ok(Self::Mmcif),
            _ => Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Parses a structure file, picking the reader from its extension.
pub fn parse_structure(path: impl AsRef<Path>) -> Result<(Structure, IngestSummary), IoError> {
    let path = path.as_ref();
    match StructureFormat::from_path(path)? {
        StructureFormat::Pdb => PdbFile::read_from_path(path),
        StructureFormat::Mmcif => MmcifFile::read_from_path(path),
    }
}
