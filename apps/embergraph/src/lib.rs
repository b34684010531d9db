//! # embergraph
//!
//! Command-line front end for the embedded graph store.
//!
//! Exposed as a library so the CLI surface and configuration resolution can
//! be exercised from integration tests.

pub mod cli;
pub mod config;
