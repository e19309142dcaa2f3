use super::ids::{AtomId, ChainId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The twenty standard amino acids.
///
/// The declaration order is the order in which residue bins are reported,
/// see [`AminoAcid::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Alanine,       // ALA
    Cysteine,      // CYS
    GlutamicAcid,  // GLU
    AsparticAcid,  // ASP
    Glycine,       // GLY
    Phenylalanine, // PHE
    Isoleucine,    // ILE
    Histidine,     // HIS
    Lysine,        // LYS
    Methionine,    // MET
    Leucine,       // LEU
    Asparagine,    // ASN
    Glutamine,     // GLN
    Proline,       // PRO
    Serine,        // SER
    Arginine,      // ARG
    Threonine,     // THR
    Tryptophan,    // TRP
    Valine,        // VAL
    Tyrosine,      // TYR
}

impl AminoAcid {
    pub const ALL: [AminoAcid; 20] = [
        AminoAcid::Alanine,
        AminoAcid::Cysteine,
        AminoAcid::GlutamicAcid,
        AminoAcid::AsparticAcid,
        AminoAcid::Glycine,
        AminoAcid::Phenylalanine,
        AminoAcid::Isoleucine,
        AminoAcid::Histidine,
        AminoAcid::Lysine,
        AminoAcid::Methionine,
        AminoAcid::Leucine,
        AminoAcid::Asparagine,
        AminoAcid::Glutamine,
        AminoAcid::Proline,
        AminoAcid::Serine,
        AminoAcid::Arginine,
        AminoAcid::Threonine,
        AminoAcid::Tryptophan,
        AminoAcid::Valine,
        AminoAcid::Tyrosine,
    ];

    pub fn to_three_letter(self) -> &'static str {
        match self {
            AminoAcid::Alanine => "ALA",
            AminoAcid::Cysteine => "CYS",
            AminoAcid::GlutamicAcid => "GLU",
            AminoAcid::AsparticAcid => "ASP",
            AminoAcid::Glycine => "GLY",
            AminoAcid::Phenylalanine => "PHE",
            AminoAcid::Isoleucine => "ILE",
            AminoAcid::Histidine => "HIS",
            AminoAcid::Lysine => "LYS",
            AminoAcid::Methionine => "MET",
            AminoAcid::Leucine => "LEU",
            AminoAcid::Asparagine => "ASN",
            AminoAcid::Glutamine => "GLN",
            AminoAcid::Proline => "PRO",
            AminoAcid::Serine => "SER",
            AminoAcid::Arginine => "ARG",
            AminoAcid::Threonine => "THR",
            AminoAcid::Tryptophan => "TRP",
            AminoAcid::Valine => "VAL",
            AminoAcid::Tyrosine => "TYR",
        }
    }

    /// Position of this amino acid in [`AminoAcid::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a standard amino acid")]
pub struct ParseAminoAcidError(pub String);

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        AminoAcid::ALL
            .iter()
            .copied()
            .find(|aa| aa.to_three_letter() == name)
            .ok_or_else(|| ParseAminoAcidError(name.to_string()))
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_three_letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source file
    pub insertion_code: Option<char>,       // PDB insertion code, if any
    pub name: String,                       // Name of the residue (e.g., "ALA", "GLY")
    pub amino_acid: Option<AminoAcid>,      // Parsed residue type, `None` for non-standard names
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Indices of atoms belonging to this residue
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(
        number: isize,
        insertion_code: Option<char>,
        name: &str,
        chain_id: ChainId,
    ) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            amino_acid: name.parse().ok(),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }
}

/// Human-readable identity of a residue, ordered by chain, number and
/// insertion code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueLabel {
    pub chain: String,
    pub number: isize,
    pub insertion_code: Option<char>,
    pub name: String,
}

impl fmt::Display for ResidueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.chain, self.name, self.number)?;
        if let Some(code) = self.insertion_code {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}
