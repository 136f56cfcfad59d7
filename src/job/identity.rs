// src/job/identity.rs

//! Content identity for jobs.
//!
//! The digest is computed over the command text with every whitespace
//! character removed, so reformatting a command (tabs vs spaces, line
//! continuations in a shell script) does not change its identity in the
//! persisted submission log.

/// Deterministic fixed-length hex digest of `command` with all whitespace
/// stripped before hashing.
pub fn content_identifier(command: &str) -> String {
    let stripped: String = command.chars().filter(|c| !c.is_whitespace()).collect();
    blake3::hash(stripped.as_bytes()).to_hex().to_string()
}
