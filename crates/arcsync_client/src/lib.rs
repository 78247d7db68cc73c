//! Arcsync client: authenticated HTTP access to the remote archive server.
mod client;
mod config;
mod error;
mod wire;

pub use client::{ArchiveClient, RemoteArchiveClient};
pub use config::{ClientSettings, ServerConfig};
pub use error::ClientError;
pub use wire::{CategoryEntry, ExtractResult, IndexEntry, SearchQuery, SearchResult};
