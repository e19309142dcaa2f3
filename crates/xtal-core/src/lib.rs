//! # xtalclass
//!
//! Classifies protein-protein interfaces in crystal structures as biological
//! (BIO) or crystallographic (XTAL) from their residue contact statistics.
//!
//! ## Layers
//!
//! - **[`core`]**: structure models, PDB/mmCIF parsing, residue property
//!   tables and the FreeSASA collaborator.
//! - **[`engine`]**: contact detection, contact classification, feature
//!   assembly and the predictor seam. Every step is a plain function over a
//!   [`core::models::structure::Structure`].
//! - **[`workflows`]**: the [`workflows::classify::InterfaceClassifier`]
//!   which runs the engine end to end and formats its results.

pub mod core;
pub mod engine;
pub mod workflows;
