//! Domain model for notes and their tags.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, session and views.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is represented by collection membership, not by a flag.

pub mod note;
