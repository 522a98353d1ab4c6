//! Document store implementations for StudyLab.

pub mod fs;
pub mod in_memory;

pub use fs::FsDocumentStore;
pub use in_memory::InMemoryDocumentStore;
