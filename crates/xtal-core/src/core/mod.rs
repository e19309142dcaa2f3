//! # Core Module
//!
//! Stateless building blocks shared by the classification engine.
//!
//! - **Structure model** ([`models`]) - arena-backed atoms, residues and chains
//! - **File I/O** ([`io`]) - PDB and mmCIF readers with the ingestion clean-up rules
//! - **Residue properties** ([`properties`]) - character classes and reference areas
//! - **Surface areas** ([`sasa`]) - wrapper around the external FreeSASA program
//! - **Utilities** ([`utils`]) - element and water identification rules

pub mod io;
pub mod models;
pub mod properties;
pub mod sasa;
pub mod utils;
