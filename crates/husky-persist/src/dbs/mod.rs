pub mod memory;
pub mod qdrant;

#[cfg(feature = "mongodb")]
pub mod mongo;
