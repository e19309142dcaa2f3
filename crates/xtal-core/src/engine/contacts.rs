use super::config::ConfigError;
use super::error::EngineError;
use super::selection::SelectionGroups;
use crate::core::models::ids::ResidueId;
use crate::core::models::structure::Structure;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument};

/// A residue pair from different selection groups with at least one atom
/// pair within the distance cutoff.
///
/// `residue_i` always sorts before `residue_j` by (chain, number, insertion
/// code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Contact {
    pub residue_i: ResidueId,
    pub residue_j: ResidueId,
}

/// Residues of the structure in canonical identifier order.
fn residues_by_identifier(structure: &Structure) -> Vec<ResidueId> {
    let mut keyed: Vec<_> = structure
        .residues_iter()
        .filter_map(|(id, _)| {
            structure
                .residue_label(id)
                .map(|label| ((label.chain, label.number, label.insertion_code), id))
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, id)| id).collect()
}

/// Finds every intermolecular residue contact within `cutoff` Å.
///
/// Atoms of chains outside the selection are ignored. The result is
/// deduplicated and sorted by `(residue_i, residue_j)` identifiers.
#[instrument(skip_all, name = "contact_detection")]
pub fn detect_contacts(
    structure: &Structure,
    groups: &SelectionGroups,
    cutoff: f64,
) -> Result<Vec<Contact>, EngineError> {
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(ConfigError::InvalidCutoff(cutoff).into());
    }
    info!(cutoff, groups = groups.len(), "Detecting intermolecular contacts.");

    let ordered = residues_by_identifier(structure);
    let rank: HashMap<ResidueId, usize> = ordered
        .iter()
        .enumerate()
        .map(|(rank, &id)| (id, rank))
        .collect();

    let mut positions: Vec<[f64; 3]> = Vec::with_capacity(structure.atom_count());
    // (residue rank, group index) per indexed atom
    let mut owners = Vec::with_capacity(structure.atom_count());
    for (_, atom) in structure.atoms_iter() {
        let Some(chain) = structure.chain_of_residue(atom.residue_id) else {
            continue;
        };
        let Some(group) = groups.group_of(&chain.id) else {
            continue;
        };
        let Some(&residue_rank) = rank.get(&atom.residue_id) else {
            continue;
        };
        positions.push([atom.position.x, atom.position.y, atom.position.z]);
        owners.push((residue_rank, group));
    }
    debug!(atoms = positions.len(), "Indexed atoms of selected chains.");

    let kdtree: KdTree<f64, 3> = (&positions).into();
    let radius_sq = cutoff * cutoff;
    // Widened query; the exact `<=` test below decides the boundary.
    let query_radius_sq = radius_sq * (1.0 + 1e-9);

    let mut unique: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (a, query) in positions.iter().enumerate() {
        for neighbour in kdtree.within_unsorted::<SquaredEuclidean>(query, query_radius_sq) {
            let b = neighbour.item as usize;
            if b <= a || neighbour.distance > radius_sq {
                continue;
            }
            let (rank_a, group_a) = owners[a];
            let (rank_b, group_b) = owners[b];
            if group_a == group_b {
                continue;
            }
            unique.insert((rank_a.min(rank_b), rank_a.max(rank_b)));
        }
    }

    if unique.is_empty() {
        return Err(EngineError::NoContacts);
    }

    let contacts: Vec<Contact> = unique
        .into_iter()
        .map(|(i, j)| Contact {
            residue_i: ordered[i],
            residue_j: ordered[j],
        })
        .collect();
    info!(contacts = contacts.len(), "Contact detection complete.");
    Ok(contacts)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    const ATOM_NAMES: [&str; 6] = ["CA", "CB", "CG", "CD", "CE", "CZ"];

    /// Adds a residue with one atom per position, creating the chain if needed.
    pub(crate) fn add_residue(
        structure: &mut Structure,
        chain: &str,
        name: &str,
        number: isize,
        positions: &[[f64; 3]],
    ) -> ResidueId {
        let chain_id = structure.add_chain(chain);
        let residue_id = structure.add_residue(chain_id, number, None, name).unwrap();
        for (atom_name, pos) in ATOM_NAMES.iter().zip(positions) {
            let atom = Atom::new(atom_name, residue_id, Point3::new(pos[0], pos[1], pos[2]));
            structure.add_atom_to_residue(residue_id, atom).unwrap();
        }
        residue_id
    }

    fn labels(structure: &Structure, contacts: &[Contact]) -> Vec<(String, String)> {
        contacts
            .iter()
            .map(|c| {
                (
                    structure.residue_label(c.residue_i).unwrap().to_string(),
                    structure.residue_label(c.residue_j).unwrap().to_string(),
                )
            })
            .collect()
    }

    fn two_chain_structure() -> Structure {
        let mut s = Structure::new("pair");
        add_residue(&mut s, "A", "TYR", 1, &[[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]]);
        add_residue(&mut s, "A", "GLY", 2, &[[0.0, 3.0, 0.0]]);
        add_residue(&mut s, "B", "ARG", 5, &[[4.0, 0.0, 0.0], [4.5, 0.5, 0.0]]);
        add_residue(&mut s, "B", "ASP", 6, &[[40.0, 0.0, 0.0]]);
        s
    }

    #[test]
    fn finds_only_intermolecular_pairs() {
        let s = two_chain_structure();
        let groups = SelectionGroups::one_per_chain(&s);
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        assert_eq!(
            labels(&s, &contacts),
            vec![
                ("A TYR1".to_string(), "B ARG5".to_string()),
                ("A GLY2".to_string(), "B ARG5".to_string()),
            ]
        );
    }

    #[test]
    fn many_atom_pairs_collapse_to_one_contact() {
        let s = two_chain_structure();
        let groups = SelectionGroups::one_per_chain(&s);
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        let unique: std::collections::HashSet<_> = contacts
            .iter()
            .map(|c| (c.residue_i.min(c.residue_j), c.residue_i.max(c.residue_j)))
            .collect();
        assert_eq!(unique.len(), contacts.len());
    }

    #[test]
    fn cutoff_boundary_is_inclusive() {
        let mut s = Structure::new("boundary");
        add_residue(&mut s, "A", "ALA", 1, &[[0.0, 0.0, 0.0]]);
        add_residue(&mut s, "B", "ALA", 1, &[[5.0, 0.0, 0.0]]);
        let groups = SelectionGroups::one_per_chain(&s);
        assert_eq!(detect_contacts(&s, &groups, 5.0).unwrap().len(), 1);
        assert!(matches!(
            detect_contacts(&s, &groups, 4.999),
            Err(EngineError::NoContacts)
        ));
    }

    #[test]
    fn distant_chains_yield_no_contacts() {
        let mut s = Structure::new("far");
        add_residue(&mut s, "A", "ALA", 1, &[[0.0, 0.0, 0.0]]);
        add_residue(&mut s, "B", "ALA", 1, &[[50.0, 0.0, 0.0]]);
        let groups = SelectionGroups::one_per_chain(&s);
        assert!(matches!(
            detect_contacts(&s, &groups, 5.0),
            Err(EngineError::NoContacts)
        ));
    }

    #[test]
    fn chains_in_the_same_group_do_not_contact() {
        let mut s = Structure::new("grouped");
        add_residue(&mut s, "A", "ALA", 1, &[[0.0, 0.0, 0.0]]);
        add_residue(&mut s, "B", "SER", 1, &[[3.0, 0.0, 0.0]]);
        add_residue(&mut s, "C", "LYS", 1, &[[6.0, 0.0, 0.0]]);

        let groups = SelectionGroups::from_tokens(&["A,B", "C"]).unwrap();
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        assert_eq!(
            labels(&s, &contacts),
            vec![("B SER1".to_string(), "C LYS1".to_string())]
        );
    }

    #[test]
    fn unselected_chains_are_ignored() {
        let mut s = Structure::new("partial");
        add_residue(&mut s, "A", "ALA", 1, &[[0.0, 0.0, 0.0]]);
        add_residue(&mut s, "B", "SER", 1, &[[3.0, 0.0, 0.0]]);
        add_residue(&mut s, "C", "LYS", 1, &[[1.0, 1.0, 0.0]]);

        let groups = SelectionGroups::from_tokens(&["A", "B"]).unwrap();
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        assert_eq!(
            labels(&s, &contacts),
            vec![("A ALA1".to_string(), "B SER1".to_string())]
        );
    }

    #[test]
    fn ordering_follows_identifiers_not_file_order() {
        let mut s = Structure::new("order");
        add_residue(&mut s, "I", "ARG", 1, &[[0.0, 0.0, 0.0]]);
        add_residue(&mut s, "E", "TYR", 20, &[[3.0, 0.0, 0.0]]);
        add_residue(&mut s, "E", "ASP", 3, &[[0.0, 3.0, 0.0]]);
        let groups = SelectionGroups::one_per_chain(&s);
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        assert_eq!(
            labels(&s, &contacts),
            vec![
                ("E ASP3".to_string(), "I ARG1".to_string()),
                ("E TYR20".to_string(), "I ARG1".to_string()),
            ]
        );
    }

    #[test]
    fn matches_brute_force_on_a_lattice_with_negative_coordinates() {
        let mut s = Structure::new("lattice");
        let mut sites = Vec::new();
        for x in -3..3 {
            for y in -2..2 {
                for z in 0..3 {
                    sites.push([
                        x as f64 * 2.7 + 0.1 * z as f64,
                        y as f64 * 3.1 - 0.05 * x as f64,
                        z as f64 * 4.4,
                    ]);
                }
            }
        }
        // Alternate sites between the two chains, one atom per residue.
        let mut chain_a = Vec::new();
        let mut chain_b = Vec::new();
        for (i, site) in sites.iter().enumerate() {
            let number = (i / 2 + 1) as isize;
            if i % 2 == 0 {
                add_residue(&mut s, "A", "ALA", number, &[*site]);
                chain_a.push((number, *site));
            } else {
                add_residue(&mut s, "B", "SER", number, &[*site]);
                chain_b.push((number, *site));
            }
        }

        let mut expected = Vec::new();
        for (na, pa) in &chain_a {
            for (nb, pb) in &chain_b {
                let d2: f64 = (0..3).map(|k| (pa[k] - pb[k]).powi(2)).sum();
                if d2 <= 25.0 {
                    expected.push((format!("A ALA{na}"), format!("B SER{nb}")));
                }
            }
        }
        assert!(!expected.is_empty());

        let groups = SelectionGroups::one_per_chain(&s);
        let contacts = detect_contacts(&s, &groups, 5.0).unwrap();
        assert_eq!(labels(&s, &contacts), expected);
    }

    #[test]
    fn coincident_atoms_are_in_contact() {
        let mut s = Structure::new("stacked");
        add_residue(&mut s, "A", "GLY", 1, &[[1.0, 1.0, 1.0]]);
        add_residue(&mut s, "B", "GLY", 1, &[[1.0, 1.0, 1.0]]);
        add_residue(&mut s, "C", "GLY", 1, &[[1.0, 1.0, 1.0]]);
        let groups = SelectionGroups::one_per_chain(&s);
        assert_eq!(detect_contacts(&s, &groups, 0.5).unwrap().len(), 3);
    }

    #[test]
    fn invalid_cutoff_is_a_configuration_error() {
        let s = two_chain_structure();
        let groups = SelectionGroups::one_per_chain(&s);
        let err = detect_contacts(&s, &groups, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::InvalidCutoff(_))));
    }
}
