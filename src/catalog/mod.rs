//! Catalog retrieval and item normalization.
//!
//! This module provides:
//! - `HttpCatalog` - Collection and item retrieval over HTTP
//! - `normalize` - Raw item validation into display records
//! - `load_catalog` - The startup loading protocol (sequential per collection)

pub mod client;
pub mod images;
pub mod loader;
pub mod normalize;
pub mod raw;

pub use client::HttpCatalog;
pub use images::HttpImageProbe;
pub use loader::{load_catalog, LoadReport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid catalog url {href:?}: {reason}")]
    InvalidUrl { href: String, reason: String },
}
