//! # Formats
//!
//! On-disk representation of the entity store.

pub mod persistence;

pub use persistence::{Persistence, collection_from_bytes, collection_to_bytes};
