//! API endpoint handlers for the file download service.

pub mod files;
