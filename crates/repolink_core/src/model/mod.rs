//! Domain model for repository links.
//!
//! # Invariants
//! - Every repository is identified by a store-assigned `RepositoryId`.
//! - Deletion is permanent; there are no tombstones.

pub mod reference;
pub mod repository;
