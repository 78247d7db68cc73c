//! Arcsync store: single-writer archive state and its presentation bridge.
mod model;
mod store;

pub use model::{StoreObserver, SyncModel};
pub use store::ArchiveStore;
