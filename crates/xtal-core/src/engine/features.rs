use super::classify::{BinTable, PairType};
use crate::core::models::residue::AminoAcid;
use serde::Serialize;
use std::fmt;

pub const FEATURE_COUNT: usize = 22;

/// Feature names in the order the pre-trained model expects them. LYS, ASN
/// and TRP are tracked in the bin table but are not model inputs.
pub const FEATURE_LABELS: [&str; FEATURE_COUNT] = [
    "CP",
    "AC",
    "AP",
    "AA",
    "ALA",
    "CYS",
    "GLU",
    "ASP",
    "GLY",
    "PHE",
    "ILE",
    "HIS",
    "MET",
    "LEU",
    "GLN",
    "PRO",
    "SER",
    "ARG",
    "THR",
    "VAL",
    "TYR",
    "link_density",
];

const PAIR_FEATURES: [PairType; 4] = [
    PairType::ChargedPolar,
    PairType::ApolarCharged,
    PairType::ApolarPolar,
    PairType::ApolarApolar,
];

const RESIDUE_FEATURES: [AminoAcid; 17] = [
    AminoAcid::Alanine,
    AminoAcid::Cysteine,
    AminoAcid::GlutamicAcid,
    AminoAcid::AsparticAcid,
    AminoAcid::Glycine,
    AminoAcid::Phenylalanine,
    AminoAcid::Isoleucine,
    AminoAcid::Histidine,
    AminoAcid::Methionine,
    AminoAcid::Leucine,
    AminoAcid::Glutamine,
    AminoAcid::Proline,
    AminoAcid::Serine,
    AminoAcid::Arginine,
    AminoAcid::Threonine,
    AminoAcid::Valine,
    AminoAcid::Tyrosine,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        FEATURE_LABELS
            .iter()
            .position(|&name| name == label)
            .map(|i| self.0[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LABELS.iter().copied().zip(self.0.iter().copied())
    }

    /// Values formatted as command-line arguments: counts without a fractional
    /// part and the link density in shortest round-trip form.
    pub fn to_args(&self) -> Vec<String> {
        self.0.iter().map(f64::to_string).collect()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

pub fn build_feature_vector(bins: &BinTable, link_density: f64) -> FeatureVector {
    let mut values = [0.0; FEATURE_COUNT];
    let counts = PAIR_FEATURES
        .iter()
        .map(|&pair| bins.pair(pair))
        .chain(RESIDUE_FEATURES.iter().map(|&aa| bins.residue(aa)));
    for (slot, count) in values.iter_mut().zip(counts) {
        *slot = count as f64;
    }
    values[FEATURE_COUNT - 1] = link_density;
    FeatureVector(values)
}
