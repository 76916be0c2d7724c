//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Own storage key names and JSON (de)serialization of note collections.
//! - Isolate storage details from the lifecycle service.

pub mod note_repo;
