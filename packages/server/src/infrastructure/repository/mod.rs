//! Quiz store implementations.

pub mod inmemory;

pub use inmemory::{CatalogError, InMemoryQuizRepository, demo_catalog, load_catalog};
