//! Storage backends for the marketplace repositories.

mod memory;

pub use memory::MemoryStore;
