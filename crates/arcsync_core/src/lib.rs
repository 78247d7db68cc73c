//! Arcsync core: pure archive data model and load-state types.
mod collection;
mod error_code;
mod item;
mod load_state;
mod strategy;

pub use collection::ArchiveCollection;
pub use error_code::ErrorCode;
pub use item::{ArchiveItem, Thumbnail};
pub use load_state::LoadState;
pub use strategy::FetchStrategy;
