//! JSON file catalog.
//!
//! The CLI has no live commerce platform behind it; it reads product records
//! from a JSON array so every catalog-shaped command can run against a file
//! export.

use kiyoh_sync::catalog::MemoryCatalog;
use kiyoh_sync_core::ProductRecord;
use thiserror::Error;

/// Failure loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogFileError {
    #[error("could not read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("could not parse catalog file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Load a JSON array of product records into an in-memory catalog.
///
/// # Errors
///
/// Returns [`CatalogFileError`] when the file is unreadable or not a JSON
/// array of product records.
pub fn load(path: &str) -> Result<MemoryCatalog, CatalogFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogFileError::Io {
        path: path.to_string(),
        source,
    })?;
    let products: Vec<ProductRecord> =
        serde_json::from_str(&raw).map_err(|source| CatalogFileError::Parse {
            path: path.to_string(),
            source,
        })?;
    Ok(MemoryCatalog::new(products))
}

/// Load the raw product list (for commands that inspect records directly).
///
/// # Errors
///
/// Same conditions as [`load`].
pub fn load_products(path: &str) -> Result<Vec<ProductRecord>, CatalogFileError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogFileError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogFileError::Parse {
        path: path.to_string(),
        source,
    })
}
