//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the snapshot contract the store persists through.
//! - Isolate file format and filesystem details from the service layer.
//!
//! # Invariants
//! - A save always writes the complete mapping; there are no partial writes.
//! - Loads reject invalid persisted state instead of masking it.

pub mod entry_repo;
