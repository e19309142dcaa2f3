//! End-to-end procedures built on the [`crate::engine`] steps.
//!
//! [`classify`] turns a parsed structure and an optional chain selection into
//! a BIO/XTAL prediction, a text report and an optional contact list.

pub mod classify;
