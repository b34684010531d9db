//! # Identifier Generator
//!
//! Entity identifiers are handed back to external callers as stable
//! references, so they come from OS randomness rather than a counter.
//! Format: canonical lowercase hyphenated UUID v4 (8-4-4-4-12).

use uuid::Uuid;

/// Produce a fresh 128-bit random identifier.
#[must_use]
pub fn new_identifier() -> String {
    Uuid::new_v4().hyphenated().to_string()
}
