//! Format-independent atom records and the clean-up rules applied when turning
//! them into a [`Structure`].

use super::error::IoError;
use crate::core::models::atom::Atom;
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::ResidueLabel;
use crate::core::models::structure::Structure;
use crate::core::properties::is_standard_amino_acid;
use crate::core::utils::identifiers::{infer_element, is_hydrogen_element, is_water_residue};
use nalgebra::Point3;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Maximum C(i)–N(i+1) distance, in Å, for two residues to be considered
/// peptide-bonded.
pub const PEPTIDE_BOND_CUTOFF: f64 = 1.8;

/// One coordinate row as read from a structure file, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub hetero: bool,
    pub serial: usize,
    pub name: String,
    pub alt_loc: Option<char>,
    pub residue_name: String,
    pub chain_id: String,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub b_factor: f64,
    pub element: String,
    pub model: usize,
}

/// A run of consecutive peptide-bonded residues within one chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub first: ResidueLabel,
    pub last: ResidueLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    pub chain_count: usize,
    pub residue_count: usize,
    pub fragments: Vec<Fragment>,
}

impl IngestSummary {
    /// A structure has gaps when its chains split into more fragments than
    /// there are chains.
    pub fn has_gaps(&self) -> bool {
        self.fragments.len() != self.chain_count
    }
}

type AtomKey = (String, isize, Option<char>, String);

/// Builds a [`Structure`] from raw records.
///
/// Keeps the first model only, drops hetero groups, waters and hydrogens,
/// resolves alternate locations to the highest-occupancy conformer and rejects
/// non-standard residues.
pub fn assemble(
    name: &str,
    records: Vec<AtomRecord>,
) -> Result<(Structure, IngestSummary), IoError> {
    let Some(first_model) = records.first().map(|r| r.model) else {
        return Err(IoError::EmptyStructure(name.to_string()));
    };

    let mut other_models = BTreeSet::new();
    let mut kept: Vec<AtomRecord> = Vec::with_capacity(records.len());
    let mut slots: HashMap<AtomKey, usize> = HashMap::new();

    for mut record in records {
        if record.model != first_model {
            other_models.insert(record.model);
            continue;
        }
        if record.hetero || is_water_residue(&record.residue_name) {
            continue;
        }
        if !is_standard_amino_acid(&record.residue_name) {
            return Err(IoError::NonStandardResidue {
                name: record.residue_name,
                chain: record.chain_id,
                number: record.residue_number,
            });
        }

        if record.element.trim().is_empty() {
            record.element = infer_element(&record.name);
        } else {
            record.element = record.element.trim().to_ascii_uppercase();
        }
        if is_hydrogen_element(&record.element) {
            continue;
        }

        let key = (
            record.chain_id.clone(),
            record.residue_number,
            record.insertion_code,
            record.name.clone(),
        );
        match slots.get(&key) {
            Some(&idx) => {
                if record.alt_loc.is_some() && record.occupancy > kept[idx].occupancy {
                    kept[idx] = record;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(record);
            }
        }
    }

    if !other_models.is_empty() {
        warn!(
            extra_models = other_models.len(),
            "Structure contains more than one model. Only the first one will be kept."
        );
    }

    let mut structure = Structure::new(name);
    for record in kept {
        let chain_id = structure.add_chain(&record.chain_id);
        let Some(residue_id) = structure.add_residue(
            chain_id,
            record.residue_number,
            record.insertion_code,
            &record.residue_name,
        ) else {
            continue;
        };
        let mut atom = Atom::new(&record.name, residue_id, record.position);
        atom.serial = record.serial;
        atom.element = record.element;
        atom.occupancy = record.occupancy;
        atom.b_factor = record.b_factor;
        structure.add_atom_to_residue(residue_id, atom);
    }

    if structure.atom_count() == 0 {
        return Err(IoError::EmptyStructure(name.to_string()));
    }

    let summary = IngestSummary {
        chain_count: structure.chain_count(),
        residue_count: structure.residue_count(),
        fragments: find_fragments(&structure),
    };

    if summary.has_gaps() {
        warn!("Structure contains gaps:");
        for (i, fragment) in summary.fragments.iter().enumerate() {
            warn!("\t{} < Fragment {} > {}", fragment.first, i, fragment.last);
        }
    }
    debug!(
        chains = summary.chain_count,
        residues = summary.residue_count,
        atoms = structure.atom_count(),
        "Structure assembled."
    );

    Ok((structure, summary))
}

fn is_peptide_bonded(structure: &Structure, previous: ResidueId, current: ResidueId) -> bool {
    let carbon = structure
        .residue(previous)
        .and_then(|r| r.get_atom_id_by_name("C"))
        .and_then(|id| structure.atom(id));
    let nitrogen = structure
        .residue(current)
        .and_then(|r| r.get_atom_id_by_name("N"))
        .and_then(|id| structure.atom(id));

    match (carbon, nitrogen) {
        (Some(c), Some(n)) => c.distance_squared(n) <= PEPTIDE_BOND_CUTOFF * PEPTIDE_BOND_CUTOFF,
        _ => false,
    }
}

/// Splits every chain into runs of peptide-bonded residues.
pub fn find_fragments(structure: &Structure) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for (_, chain) in structure.chains_iter() {
        let mut start: Option<ResidueId> = None;
        let mut previous: Option<ResidueId> = None;

        for &residue_id in chain.residues() {
            match previous {
                Some(prev) if is_peptide_bonded(structure, prev, residue_id) => {}
                Some(prev) => {
                    if let Some(fragment) = make_fragment(structure, start, prev) {
                        fragments.push(fragment);
                    }
                    start = Some(residue_id);
                }
                None => start = Some(residue_id),
            }
            previous = Some(residue_id);
        }

        if let Some(prev) = previous {
            if let Some(fragment) = make_fragment(structure, start, prev) {
                fragments.push(fragment);
            }
        }
    }

    fragments
}

fn make_fragment(
    structure: &Structure,
    start: Option<ResidueId>,
    end: ResidueId,
) -> Option<Fragment> {
    Some(Fragment {
        first: structure.residue_label(start?)?,
        last: structure.residue_label(end)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        chain: &str,
        residue_name: &str,
        residue_number: isize,
        name: &str,
        position: [f64; 3],
    ) -> AtomRecord {
        AtomRecord {
            hetero: false,
            serial: 1,
            name: name.to_string(),
            alt_loc: None,
            residue_name: residue_name.to_string(),
            chain_id: chain.to_string(),
            residue_number,
            insertion_code: None,
            position: Point3::new(position[0], position[1], position[2]),
            occupancy: 1.0,
            b_factor: 0.0,
            element: String::new(),
            model: 1,
        }
    }

    fn backbone(chain: &str, residue_name: &str, number: isize, x: f64) -> Vec<AtomRecord> {
        vec![
            record(chain, residue_name, number, "N", [x, 0.0, 0.0]),
            record(chain, residue_name, number, "CA", [x + 1.45, 0.0, 0.0]),
            record(chain, residue_name, number, "C", [x + 2.5, 0.0, 0.0]),
        ]
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            assemble("empty", Vec::new()),
            Err(IoError::EmptyStructure(name)) if name == "empty"
        ));
    }

    #[test]
    fn keeps_only_the_first_model() {
        let mut records = backbone("A", "ALA", 1, 0.0);
        let mut second = backbone("A", "ALA", 1, 50.0);
        second.iter_mut().for_each(|r| r.model = 2);
        records.extend(second);

        let (structure, _) = assemble("models", records).unwrap();
        assert_eq!(structure.atom_count(), 3);
        assert!(structure.atoms_iter().all(|(_, a)| a.position.x < 10.0));
    }

    #[test]
    fn drops_hetero_groups_waters_and_hydrogens() {
        let mut records = backbone("A", "GLY", 1, 0.0);
        let mut ligand = record("A", "NAG", 900, "C1", [5.0, 5.0, 5.0]);
        ligand.hetero = true;
        records.push(ligand);
        records.push(record("W", "HOH", 1, "O", [9.0, 9.0, 9.0]));
        let mut hydrogen = record("A", "GLY", 1, "HA2", [0.5, 0.5, 0.5]);
        hydrogen.element = "H".to_string();
        records.push(hydrogen);
        records.push(record("A", "GLY", 1, "1HA", [0.5, 0.5, -0.5]));

        let (structure, summary) = assemble("filtered", records).unwrap();
        assert_eq!(structure.atom_count(), 3);
        assert_eq!(summary.chain_count, 1);
        assert_eq!(summary.residue_count, 1);
        assert!(structure.find_chain_by_id("W").is_none());
    }

    #[test]
    fn rejects_non_standard_residues() {
        let mut records = backbone("A", "ALA", 1, 0.0);
        records.push(record("A", "MSE", 2, "CA", [4.0, 0.0, 0.0]));

        let err = assemble("nonstandard", records).unwrap_err();
        assert!(matches!(
            err,
            IoError::NonStandardResidue { ref name, ref chain, number: 2 } if name == "MSE" && chain == "A"
        ));
    }

    #[test]
    fn resolves_alternate_locations_by_highest_occupancy() {
        let mut first = record("A", "SER", 1, "OG", [0.0, 0.0, 0.0]);
        first.alt_loc = Some('A');
        first.occupancy = 0.4;
        let mut second = record("A", "SER", 1, "OG", [1.0, 1.0, 1.0]);
        second.alt_loc = Some('B');
        second.occupancy = 0.6;
        let mut third = record("A", "SER", 1, "OG", [2.0, 2.0, 2.0]);
        third.alt_loc = Some('C');
        third.occupancy = 0.6;

        let (structure, _) = assemble("altloc", vec![first, second, third]).unwrap();
        assert_eq!(structure.atom_count(), 1);
        let (_, atom) = structure.atoms_iter().next().unwrap();
        assert_eq!(atom.position, Point3::new(1.0, 1.0, 1.0));
        assert_eq!(atom.occupancy, 0.6);
    }

    #[test]
    fn element_is_inferred_when_blank() {
        let (structure, _) = assemble("element", backbone("A", "ALA", 1, 0.0)).unwrap();
        let elements: Vec<_> = structure
            .atoms_iter()
            .map(|(_, a)| a.element.as_str())
            .collect();
        assert_eq!(elements, vec!["N", "C", "C"]);
    }

    #[test]
    fn contiguous_chain_forms_a_single_fragment() {
        let mut records = backbone("A", "ALA", 1, 0.0);
        // C of residue 1 at x=2.5, N of residue 2 at x=3.8 (1.3 Å apart).
        records.extend(backbone("A", "GLY", 2, 3.8));
        records.extend(backbone("B", "LYS", 1, 30.0));

        let (_, summary) = assemble("contiguous", records).unwrap();
        assert_eq!(summary.fragments.len(), 2);
        assert!(!summary.has_gaps());
        assert_eq!(summary.fragments[0].first.number, 1);
        assert_eq!(summary.fragments[0].last.number, 2);
    }

    #[test]
    fn chain_break_is_reported_as_a_gap() {
        let mut records = backbone("A", "ALA", 1, 0.0);
        records.extend(backbone("A", "GLY", 2, 3.8));
        records.extend(backbone("A", "SER", 10, 20.0));

        let (_, summary) = assemble("gapped", records).unwrap();
        assert!(summary.has_gaps());
        assert_eq!(summary.fragments.len(), 2);
        assert_eq!(summary.fragments[1].first.name, "SER");
        assert_eq!(summary.fragments[1].last.number, 10);
    }
}
