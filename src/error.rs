//! Error type shared by the library, the rewrite passes and the save hooks.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::AssetId;

/// Convenience alias used across the crate.
pub type FilerResult<T> = Result<T, FilerError>;

/// Errors surfaced while storing, rewriting or serving library assets.
#[derive(Debug, Error)]
pub enum FilerError {
  /// Underlying storage failure.
  #[error(transparent)]
  Io(#[from] io::Error),

  /// The catalog has no asset with this identifier.
  #[error("asset {0} does not exist in the library")]
  AssetNotFound(AssetId),

  /// A served path does not resolve to any asset.
  #[error("No such file: {0}")]
  NotFound(String),

  /// The persisted catalog could not be parsed.
  #[error("failed to parse catalog at {path}")]
  Catalog {
    /// Path of the catalog file.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },

  /// The catalog could not be serialised for writing.
  #[error("failed to serialise catalog for {path}")]
  CatalogWrite {
    /// Path of the catalog file.
    path: PathBuf,
    /// Source serialisation error.
    #[source]
    source: serde_json::Error,
  },
}
