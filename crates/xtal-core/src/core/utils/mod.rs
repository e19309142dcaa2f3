//! Shared helpers for atom naming rules.

pub mod identifiers;
