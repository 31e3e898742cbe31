//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the persistence gateway contract for repository links.
//! - Isolate SQLite query and clause-building details from services.
//!
//! # Invariants
//! - Write paths validate requests before SQL mutations.
//! - Store APIs return semantic errors (`NotFound`, `Conflict`, `Constraint`)
//!   in addition to transport errors.

pub mod clause;
pub mod error;
pub mod reference_repo;
pub mod repository_repo;
