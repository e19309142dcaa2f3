//! # Engine Module
//!
//! The contact-based interface analysis: chain grouping, contact detection,
//! contact classification, feature assembly and the predictor seam.
//!
//! ## Overview
//!
//! Each stage is a plain function over a read-only [`Structure`](crate::core::models::structure::Structure),
//! so a full analysis is a pure function of the structure, the selection and
//! the distance cutoff. The stages are:
//!
//! - **Selection** ([`selection`]) - partition of chains into interacting molecules
//! - **Contacts** ([`contacts`]) - cross-group residue pairs within the cutoff
//! - **Classification** ([`classify`]) - pair-type and residue-type bins, link density
//! - **Features** ([`features`]) - the fixed 22-value model input
//! - **Prediction** ([`predictor`]) - the [`predictor::Predictor`] trait and a subprocess implementation
//!
//! Supporting modules hold the [`config`], the [`error`] types and [`progress`] reporting.

pub mod classify;
pub mod config;
pub mod contacts;
pub mod error;
pub mod features;
pub mod predictor;
pub mod progress;
pub mod selection;
