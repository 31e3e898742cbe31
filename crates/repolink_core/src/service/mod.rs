//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep CLI/handler layers decoupled from storage details.

pub mod repository_service;
