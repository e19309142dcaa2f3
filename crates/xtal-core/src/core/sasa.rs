//! Solvent accessible surface areas via the external FreeSASA program.
//!
//! The structure is written to a temporary PDB file, FreeSASA writes per-atom
//! areas into the B-factor column of another temporary PDB file, and that file
//! is read back. Both files are removed when the call returns.

use crate::core::io::error::IoError;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::Structure;
use crate::core::properties::reference_area;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum SasaError {
    #[error("freesasa binary not found at '{}'", .0.display())]
    BinaryNotFound(PathBuf),

    #[error("Could not determine the freesasa version of '{}': {reason}", binary.display())]
    Version { binary: PathBuf, reason: String },

    #[error("Atomic radii file not found at '{}'", .0.display())]
    ParameterFileNotFound(PathBuf),

    #[error("I/O error while running freesasa: {0}")]
    Io(#[from] std::io::Error),

    #[error("freesasa did not run successfully (exit code {status:?}): {stderr}")]
    ToolFailed { status: Option<i32>, stderr: String },

    #[error("Failed to exchange structure data with freesasa: {0}")]
    Output(#[from] IoError),
}

/// (chain, residue name, residue number, atom name)
pub type AtomKey = (String, String, isize, String);
/// (chain, residue name, residue number)
pub type ResidueKey = (String, String, isize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SasaResult {
    /// Absolute accessible area per atom, in Å².
    pub atom_asa: BTreeMap<AtomKey, f64>,
    /// Residue area relative to the residue's reference area.
    pub residue_rsa: BTreeMap<ResidueKey, f64>,
}

#[derive(Debug, Clone)]
pub struct FreeSasa {
    binary: PathBuf,
    parameter_file: Option<PathBuf>,
}

impl FreeSasa {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            parameter_file: None,
        }
    }

    /// Radii parameter file, required by FreeSASA releases before 2.0.
    pub fn with_parameter_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.parameter_file = Some(path.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Queries `freesasa -v` and returns the (major, minor) version.
    pub fn version(&self) -> Result<(u32, u32), SasaError> {
        if !self.binary.is_file() {
            return Err(SasaError::BinaryNotFound(self.binary.clone()));
        }
        let output = Command::new(&self.binary)
            .arg("-v")
            .output()
            .map_err(|e| SasaError::Version {
                binary: self.binary.clone(),
                reason: e.to_string(),
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_version(&stdout).ok_or_else(|| SasaError::Version {
            binary: self.binary.clone(),
            reason: format!("unrecognised version string '{}'", stdout.trim()),
        })
    }

    /// Computes per-atom and per-residue accessibility, optionally restricted
    /// to a set of chains.
    #[instrument(skip_all, name = "freesasa")]
    pub fn compute(
        &self,
        structure: &Structure,
        chains: Option<&HashSet<String>>,
    ) -> Result<SasaResult, SasaError> {
        let (major, minor) = self.version()?;
        debug!(major, minor, "Detected freesasa version.");

        let parameter_file = match (&self.parameter_file, major < 2) {
            (Some(path), true) if path.is_file() => Some(path.clone()),
            (Some(path), true) => return Err(SasaError::ParameterFileNotFound(path.clone())),
            (None, true) => return Err(SasaError::ParameterFileNotFound(PathBuf::new())),
            (_, false) => None,
        };

        let mut input = NamedTempFile::with_suffix(".pdb")?;
        PdbFile::write_to(structure, chains, &mut input)?;
        input.flush()?;
        let output = NamedTempFile::with_suffix(".pdb")?;

        let mut command = Command::new(&self.binary);
        match parameter_file {
            None => {
                command
                    .arg(input.path())
                    .arg("--format=pdb")
                    .arg("--radii=naccess")
                    .arg("-o")
                    .arg(output.path());
            }
            Some(params) => {
                let mut b_value_arg = std::ffi::OsString::from("--B-value-file=");
                b_value_arg.push(output.path());
                command.arg(b_value_arg).arg("-c").arg(params).arg(input.path());
            }
        }
        debug!(command = ?command, "Running freesasa.");

        let result = command.output()?;
        if !result.status.success() {
            return Err(SasaError::ToolFailed {
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let mut reader = BufReader::new(File::open(output.path())?);
        parse_output(&mut reader)
    }
}

fn parse_version(text: &str) -> Option<(u32, u32)> {
    let first = text.lines().next()?.trim();
    let version = first.strip_prefix("FreeSASA").unwrap_or(first).trim();
    let mut parts = version.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    Some((major, minor))
}

/// Reads FreeSASA's PDB output, where the B-factor column holds atomic areas.
fn parse_output(reader: &mut impl std::io::BufRead) -> Result<SasaResult, SasaError> {
    let records = PdbFile::read_records(reader)?;
    let mut result = SasaResult::default();
    let mut residue_totals: BTreeMap<ResidueKey, f64> = BTreeMap::new();

    for record in records {
        let residue_key = (
            record.chain_id.clone(),
            record.residue_name.clone(),
            record.residue_number,
        );
        *residue_totals.entry(residue_key).or_default() += record.b_factor;
        result.atom_asa.insert(
            (
                record.chain_id,
                record.residue_name,
                record.residue_number,
                record.name,
            ),
            record.b_factor,
        );
    }

    for (key, total) in residue_totals {
        let reference = reference_area(&key.1).ok_or_else(|| IoError::NonStandardResidue {
            name: key.1.clone(),
            chain: key.0.clone(),
            number: key.2,
        })?;
        result.residue_rsa.insert(key, total / reference.total);
    }

    Ok(result)
}
