//! Error types for the catalog.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while installing catalog domains.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown catalog domain: {0}")]
    UnknownDomain(String),

    #[error("Spec error: {0}")]
    Spec(#[from] specular_spec::SpecError),
}
