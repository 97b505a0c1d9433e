//! Form implementations
//!
//! Provides the in-memory form used by tests and the console front-end.

pub mod memory;

pub use memory::{MemoryField, MemoryForm, MemoryFormHandle};
