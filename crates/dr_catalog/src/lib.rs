//! dr_catalog — I/O for the DR placement engine: loads the `RuleCatalog`
//! and external lookup documents, and provides canonical JSON + SHA-256
//! fingerprinting shared by both.
//!
//! No inline implementations here: real logic lives in the submodules so
//! the public surface stays a thin, stable re-export.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for dr_catalog (used by rule_catalog/dimensioning/pod_flavor).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io/path error: {0}")]
    Path(String),

    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    #[error("hash error: {0}")]
    Hash(String),

    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod rule_catalog;
pub mod dimensioning;
pub mod pod_flavor;

pub mod prelude {
    pub use crate::{CatalogError, CatalogResult};
    pub use crate::canonical_json;
    #[cfg(feature = "hash")]
    pub use crate::hasher::sha256_hex;
    pub use crate::rule_catalog::RuleCatalog;
    pub use crate::dimensioning::{DimensioningLookup, JsonDimensioningTable};
    pub use crate::pod_flavor::{PodFlavorSpec, PodFlavorTable, JsonPodFlavorTable};
}
