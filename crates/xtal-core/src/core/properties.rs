//! Physicochemical properties of the standard amino acids.
//!
//! Two character tables are provided because contact statistics and surface
//! statistics historically classify a few residues differently:
//!
//! | Residue | [`contact_character`] | [`surface_character`] |
//! |---------|-----------------------|-----------------------|
//! | CYS     | Apolar                | Polar                 |
//! | HIS     | Charged               | Polar                 |
//! | TRP     | Apolar                | Polar                 |
//! | TYR     | Apolar                | Polar                 |
//!
//! The contact table is the one the interface predictor was trained on and must
//! be used for contact binning. The surface table applies to non-interacting
//! surface composition only.

use phf::{Map, phf_map};
use serde::Serialize;
use std::fmt;

/// Physicochemical character of a residue side chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CharacterClass {
    Apolar,
    Charged,
    Polar,
}

impl CharacterClass {
    /// Single-letter code used to build contact pair labels.
    pub fn code(self) -> char {
        match self {
            CharacterClass::Apolar => 'A',
            CharacterClass::Charged => 'C',
            CharacterClass::Polar => 'P',
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CharacterClass::Apolar => "apolar",
            CharacterClass::Charged => "charged",
            CharacterClass::Polar => "polar",
        })
    }
}

static CONTACT_CHARACTER: Map<&'static str, CharacterClass> = phf_map! {
    "ALA" => CharacterClass::Apolar,
    "CYS" => CharacterClass::Apolar,
    "GLU" => CharacterClass::Charged,
    "ASP" => CharacterClass::Charged,
    "GLY" => CharacterClass::Apolar,
    "PHE" => CharacterClass::Apolar,
    "ILE" => CharacterClass::Apolar,
    "HIS" => CharacterClass::Charged,
    "LYS" => CharacterClass::Charged,
    "MET" => CharacterClass::Apolar,
    "LEU" => CharacterClass::Apolar,
    "ASN" => CharacterClass::Polar,
    "GLN" => CharacterClass::Polar,
    "PRO" => CharacterClass::Apolar,
    "SER" => CharacterClass::Polar,
    "ARG" => CharacterClass::Charged,
    "THR" => CharacterClass::Polar,
    "TRP" => CharacterClass::Apolar,
    "VAL" => CharacterClass::Apolar,
    "TYR" => CharacterClass::Apolar,
};

static SURFACE_CHARACTER: Map<&'static str, CharacterClass> = phf_map! {
    "ALA" => CharacterClass::Apolar,
    "CYS" => CharacterClass::Polar,
    "GLU" => CharacterClass::Charged,
    "ASP" => CharacterClass::Charged,
    "GLY" => CharacterClass::Apolar,
    "PHE" => CharacterClass::Apolar,
    "ILE" => CharacterClass::Apolar,
    "HIS" => CharacterClass::Polar,
    "LYS" => CharacterClass::Charged,
    "MET" => CharacterClass::Apolar,
    "LEU" => CharacterClass::Apolar,
    "ASN" => CharacterClass::Polar,
    "GLN" => CharacterClass::Polar,
    "PRO" => CharacterClass::Apolar,
    "SER" => CharacterClass::Polar,
    "ARG" => CharacterClass::Charged,
    "THR" => CharacterClass::Polar,
    "TRP" => CharacterClass::Polar,
    "VAL" => CharacterClass::Apolar,
    "TYR" => CharacterClass::Polar,
};

/// Reference accessible surface areas (Å²) of a residue in an extended
/// Gly-X-Gly tripeptide, computed with NACCESS radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceArea {
    pub total: f64,
    pub backbone: f64,
    pub side_chain: f64,
}

const fn area(total: f64, backbone: f64, side_chain: f64) -> ReferenceArea {
    ReferenceArea {
        total,
        backbone,
        side_chain,
    }
}

static RELATIVE_ASA: Map<&'static str, ReferenceArea> = phf_map! {
    "ALA" => area(107.95, 38.54, 69.41),
    "CYS" => area(134.28, 37.53, 96.75),
    "ASP" => area(140.39, 37.70, 102.69),
    "GLU" => area(172.25, 37.51, 134.74),
    "PHE" => area(199.48, 35.37, 164.11),
    "GLY" => area(80.10, 47.77, 32.33),
    "HIS" => area(182.88, 35.80, 147.08),
    "ILE" => area(175.12, 37.16, 137.96),
    "LYS" => area(200.81, 37.51, 163.30),
    "LEU" => area(178.63, 37.51, 141.12),
    "MET" => area(194.15, 37.51, 156.64),
    "ASN" => area(143.94, 37.70, 106.24),
    "PRO" => area(136.13, 16.23, 119.90),
    "GLN" => area(178.50, 37.51, 140.99),
    "ARG" => area(238.76, 37.51, 201.25),
    "SER" => area(116.50, 38.40, 78.11),
    "THR" => area(139.27, 37.57, 101.70),
    "VAL" => area(151.44, 37.16, 114.28),
    "TRP" => area(249.36, 38.10, 211.26),
    "TYR" => area(212.76, 35.38, 177.38),
};

/// Character class used for contact binning. `None` for non-standard names.
pub fn contact_character(residue_name: &str) -> Option<CharacterClass> {
    CONTACT_CHARACTER.get(residue_name.trim()).copied()
}

/// Character class used for surface composition. `None` for non-standard names.
pub fn surface_character(residue_name: &str) -> Option<CharacterClass> {
    SURFACE_CHARACTER.get(residue_name.trim()).copied()
}

pub fn reference_area(residue_name: &str) -> Option<ReferenceArea> {
    RELATIVE_ASA.get(residue_name.trim()).copied()
}

pub fn is_standard_amino_acid(residue_name: &str) -> bool {
    CONTACT_CHARACTER.contains_key(residue_name.trim())
}
