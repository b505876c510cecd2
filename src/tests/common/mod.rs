//! Common Test Utilities
//!
//! Shared fixtures used across test modules: rule tables, seeded random
//! sources, prepared characters and scratch directories.

pub mod fixtures;

pub use fixtures::*;
