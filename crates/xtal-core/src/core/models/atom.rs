use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents a single heavy atom of a parsed structure.
///
/// Atoms are created once during ingestion and are read-only for the
/// classification pipeline. The chain and residue an atom belongs to are
/// reached through [`Atom::residue_id`] and the owning
/// [`Structure`](super::structure::Structure).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "CA", "N", "OG1").
    pub name: String,
    /// The serial number from the source file.
    pub serial: usize,
    /// The element symbol in upper case (e.g., "C", "SE").
    pub element: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Fractional occupancy of the selected conformer.
    pub occupancy: f64,
    /// Temperature factor column. Solvent-accessibility tools reuse this
    /// column to report per-atom areas.
    pub b_factor: f64,
}

impl Atom {
    /// Creates a new `Atom` with full occupancy and a zero B-factor.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            serial: 0,
            element: crate::core::utils::identifiers::infer_element(name),
            residue_id,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }

    /// Returns `true` if this atom is a hydrogen or deuterium.
    pub fn is_hydrogen(&self) -> bool {
        crate::core::utils::identifiers::is_hydrogen_element(&self.element)
    }

    /// Squared Euclidean distance to another atom, in Å².
    pub fn distance_squared(&self, other: &Atom) -> f64 {
        nalgebra::distance_squared(&self.position, &other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ResidueId;
    use nalgebra::Point3;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let residue_id = ResidueId::default();
        let atom = Atom::new("CA", residue_id, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.name, "CA");
        assert_eq!(atom.residue_id, residue_id);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.element, "C");
        assert_eq!(atom.serial, 0);
        assert_eq!(atom.occupancy, 1.0);
        assert_eq!(atom.b_factor, 0.0);
    }

    #[test]
    fn hydrogen_detection_uses_element() {
        let residue_id = ResidueId::default();
        let mut atom = Atom::new("HB2", residue_id, Point3::origin());
        assert!(atom.is_hydrogen());

        atom.element = "C".to_string();
        assert!(!atom.is_hydrogen());
    }

    #[test]
    fn distance_squared_between_atoms() {
        let residue_id = ResidueId::default();
        let a = Atom::new("N", residue_id, Point3::new(0.0, 0.0, 0.0));
        let b = Atom::new("O", residue_id, Point3::new(3.0, 4.0, 0.0));
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(b.distance_squared(&a), 25.0);
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let residue_id = ResidueId::default();
        let mut atom1 = Atom::new("N", residue_id, Point3::new(0.0, 0.0, 0.0));
        atom1.b_factor = 12.5;
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
    }
}
