//! # Core Models Module
//!
//! Data structures representing a parsed macromolecular structure.
//!
//! ## Overview
//!
//! A [`structure::Structure`] exclusively owns its chains, residues and atoms in
//! arena storage keyed by the identifiers in [`ids`]. Parent relations
//! (atom → residue → chain) are kept as keys, so walking up the hierarchy is a
//! constant-time lookup and the ownership graph stays acyclic.
//!
//! ## Key Components
//!
//! - [`atom`] - Heavy atoms with coordinates, element, occupancy and B-factor
//! - [`residue`] - Residues, the standard amino-acid enumeration and printable labels
//! - [`chain`] - Ordered residue containers
//! - [`structure`] - The owning container for a single model
//! - [`ids`] - Arena keys for atoms, residues and chains
//!
//! ## Usage
//!
//! ```ignore
//! use xtalclass::core::models::{atom::Atom, structure::Structure};
//!
//! let mut structure = Structure::new("1abc");
//! let chain_id = structure.add_chain("A");
//! let residue_id = structure.add_residue(chain_id, 1, None, "ALA").unwrap();
//! structure.add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()));
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod structure;
