//! Cache store implementations.
//!
//! - [`DiskCache`]: one file per entry, shared across processes
//! - [`MemoryCache`]: process-local DashMap, used by tests and embedders

mod disk;
mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;
