//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the in-memory store, persistence, queries and export.
//! - Keep front ends decoupled from storage details.

pub mod knowledge_base;
