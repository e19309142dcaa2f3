use super::contacts::Contact;
use super::error::EngineError;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::AminoAcid;
use crate::core::models::structure::Structure;
use crate::core::properties::{CharacterClass, contact_character};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Physicochemical type of a contact, named by the sorted character codes of
/// its two residues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairType {
    ApolarApolar,
    PolarPolar,
    ChargedCharged,
    ApolarPolar,
    ChargedPolar,
    ApolarCharged,
}

impl PairType {
    pub const ALL: [PairType; 6] = [
        PairType::ApolarApolar,
        PairType::PolarPolar,
        PairType::ChargedCharged,
        PairType::ApolarPolar,
        PairType::ChargedPolar,
        PairType::ApolarCharged,
    ];

    pub fn from_classes(a: CharacterClass, b: CharacterClass) -> Self {
        use CharacterClass::*;
        match (a, b) {
            (Apolar, Apolar) => PairType::ApolarApolar,
            (Polar, Polar) => PairType::PolarPolar,
            (Charged, Charged) => PairType::ChargedCharged,
            (Apolar, Polar) | (Polar, Apolar) => PairType::ApolarPolar,
            (Charged, Polar) | (Polar, Charged) => PairType::ChargedPolar,
            (Apolar, Charged) | (Charged, Apolar) => PairType::ApolarCharged,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PairType::ApolarApolar => "AA",
            PairType::PolarPolar => "PP",
            PairType::ChargedCharged => "CC",
            PairType::ApolarPolar => "AP",
            PairType::ChargedPolar => "CP",
            PairType::ApolarCharged => "AC",
        }
    }

    /// Long form used in reports, e.g. "charged-apolar".
    pub fn description(self) -> &'static str {
        match self {
            PairType::ApolarApolar => "apolar-apolar",
            PairType::PolarPolar => "polar-polar",
            PairType::ChargedCharged => "charged-charged",
            PairType::ApolarPolar => "apolar-polar",
            PairType::ChargedPolar => "charged-polar",
            PairType::ApolarCharged => "charged-apolar",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Contact counts per pair type and per residue type.
///
/// Every contact increments one pair bin and the residue bins of both of its
/// residues, so a residue seen in N contacts contributes N to its bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinTable {
    pairs: [usize; 6],
    residues: [usize; 20],
}

impl BinTable {
    pub const LEN: usize = 26;

    pub fn pair(&self, pair: PairType) -> usize {
        self.pairs[pair.index()]
    }

    pub fn residue(&self, amino_acid: AminoAcid) -> usize {
        self.residues[amino_acid.index()]
    }

    /// Looks up a bin by its label ("AC", "TYR", ...).
    pub fn get(&self, label: &str) -> Option<usize> {
        self.iter()
            .find(|(name, _)| *name == label)
            .map(|(_, count)| count)
    }

    /// All 26 bins: the six pair types followed by the residue types.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        let pairs = PairType::ALL.iter().map(|&p| (p.label(), self.pair(p)));
        let residues = AminoAcid::ALL
            .iter()
            .map(|&aa| (aa.to_three_letter(), self.residue(aa)));
        pairs.chain(residues)
    }

    pub fn pair_total(&self) -> usize {
        self.pairs.iter().sum()
    }

    pub fn residue_total(&self) -> usize {
        self.residues.iter().sum()
    }

    #[cfg(test)]
    pub(crate) fn from_counts(pairs: [usize; 6], residues: [usize; 20]) -> Self {
        Self { pairs, residues }
    }

    fn record(&mut self, pair: PairType, first: AminoAcid, second: AminoAcid) {
        self.pairs[pair.index()] += 1;
        self.residues[first.index()] += 1;
        self.residues[second.index()] += 1;
    }
}

impl Serialize for BinTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Self::LEN))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

fn residue_character(
    structure: &Structure,
    id: ResidueId,
) -> Result<(AminoAcid, CharacterClass), EngineError> {
    let residue = structure
        .residue(id)
        .ok_or_else(|| EngineError::Internal("contact refers to a residue outside the structure".into()))?;
    match (residue.amino_acid, contact_character(&residue.name)) {
        (Some(aa), Some(class)) => Ok((aa, class)),
        _ => Err(EngineError::UnknownResidue {
            name: residue.name.clone(),
            chain: structure
                .chain_of_residue(id)
                .map(|c| c.id.clone())
                .unwrap_or_default(),
            number: residue.number,
        }),
    }
}

/// Bins every contact by pair type and residue type.
#[instrument(skip_all, name = "contact_classification")]
pub fn classify(structure: &Structure, contacts: &[Contact]) -> Result<BinTable, EngineError> {
    let mut bins = BinTable::default();
    for contact in contacts {
        let (aa_i, class_i) = residue_character(structure, contact.residue_i)?;
        let (aa_j, class_j) = residue_character(structure, contact.residue_j)?;
        bins.record(PairType::from_classes(class_i, class_j), aa_i, aa_j);
    }
    debug!(contacts = contacts.len(), "Contacts classified.");
    Ok(bins)
}

/// Fraction of realised contacts among all possible pairs of interface
/// residues: `contacts / (distinct first residues × distinct second residues)`.
pub fn link_density(contacts: &[Contact]) -> Result<f64, EngineError> {
    let first: HashSet<ResidueId> = contacts.iter().map(|c| c.residue_i).collect();
    let second: HashSet<ResidueId> = contacts.iter().map(|c| c.residue_j).collect();
    let max_contacts = first.len() * second.len();
    if max_contacts == 0 {
        return Err(EngineError::UndefinedLinkDensity);
    }
    Ok(contacts.len() as f64 / max_contacts as f64)
}
