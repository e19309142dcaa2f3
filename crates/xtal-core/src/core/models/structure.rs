use super::atom::Atom;
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::{Residue, ResidueLabel};
use slotmap::SlotMap;
use std::collections::HashMap;

/// A single-model macromolecular structure.
///
/// The structure exclusively owns its chains, residues and atoms in slot-map
/// arenas. Child-to-parent relations (atom → residue → chain) are stored as
/// keys, so parent lookups are O(1) without back-pointers.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Identifier of the structure, usually the input file stem.
    name: String,
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// Chains in the order they were first added.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding residues by chain, number and insertion code.
    residue_id_map: HashMap<(ChainId, isize, Option<char>), ResidueId>,
    /// Lookup map for finding chains by their identifier.
    chain_id_map: HashMap<String, ChainId>,
}

impl Structure {
    /// Creates a new, empty structure with the given identifier.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    /// Returns the chain that owns the given residue.
    pub fn chain_of_residue(&self, id: ResidueId) -> Option<&Chain> {
        self.residues
            .get(id)
            .and_then(|residue| self.chains.get(residue.chain_id))
    }

    /// Iterates over chains in structure order.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chain_order
            .iter()
            .filter_map(move |&id| self.chains.get(id).map(|chain| (id, chain)))
    }

    /// Iterates over residues in structure order (chain by chain).
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.chains_iter().flat_map(move |(_, chain)| {
            chain
                .residues()
                .iter()
                .filter_map(move |&id| self.residues.get(id).map(|residue| (id, residue)))
        })
    }

    /// Iterates over atoms in structure order (residue by residue).
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.residues_iter().flat_map(move |(_, residue)| {
            residue
                .atoms()
                .iter()
                .filter_map(move |&id| self.atoms.get(id).map(|atom| (id, atom)))
        })
    }

    pub fn chain_count(&self) -> usize {
        self.chain_order.len()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn find_chain_by_id(&self, id: &str) -> Option<ChainId> {
        self.chain_id_map.get(id).copied()
    }

    pub fn find_residue_by_id(
        &self,
        chain_id: ChainId,
        number: isize,
        insertion_code: Option<char>,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, number, insertion_code))
            .copied()
    }

    /// Builds the printable identity of a residue.
    pub fn residue_label(&self, id: ResidueId) -> Option<ResidueLabel> {
        let residue = self.residues.get(id)?;
        let chain = self.chains.get(residue.chain_id)?;
        Some(ResidueLabel {
            chain: chain.id.clone(),
            number: residue.number,
            insertion_code: residue.insertion_code,
            name: residue.name.clone(),
        })
    }

    /// Adds a chain, or returns the existing one with the same identifier.
    pub fn add_chain(&mut self, id: &str) -> ChainId {
        if let Some(&existing) = self.chain_id_map.get(id) {
            return existing;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_order.push(chain_id);
        self.chain_id_map.insert(id.to_string(), chain_id);
        chain_id
    }

    /// Adds a residue to a chain.
    ///
    /// # Return
    ///
    /// Returns the new residue ID, the existing ID if a residue with the same
    /// number and insertion code is already present, or `None` if the chain
    /// does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        number: isize,
        insertion_code: Option<char>,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        if let Some(&existing) = self
            .residue_id_map
            .get(&(chain_id, number, insertion_code))
        {
            return Some(existing);
        }
        let residue_id = self
            .residues
            .insert(Residue::new(number, insertion_code, name, chain_id));
        chain.residues.push(residue_id);
        self.residue_id_map
            .insert((chain_id, number, insertion_code), residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a residue. The atom's `residue_id` is overwritten.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        let residue = self.residues.get_mut(residue_id)?;
        atom.residue_id = residue_id;
        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        residue.add_atom(&name, atom_id);
        Some(atom_id)
    }
}
