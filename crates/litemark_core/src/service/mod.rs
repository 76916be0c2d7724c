//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collection loads/saves into lifecycle use-cases.
//! - Keep front-ends decoupled from storage details.

pub mod note_service;
pub mod seed;
