//! Application services for the file download service.

pub mod cache;
pub mod resources;
pub mod transfer;

pub use resources::{DirectoryResources, EmbeddedResources, Resource, ResourceStore};
pub use transfer::TransferError;
