//! Library configuration describing storage layout and URL generation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::library::DEFAULT_CACHE_KEY_PREFIX;

const DEFAULT_CONFIG_FILE: &str = "filer.config.json";

/// How the back-reference pass finds stylesheets referencing a saved asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackReferenceLookup {
  /// Consult the reference index maintained by the forward pass.
  #[default]
  Index,
  /// Read every stylesheet in the library and look for the logical marker.
  Scan,
}

/// Discoverable configuration of an on-disk file library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilerConfig {
  /// Directory below the library root holding stored files.
  pub storage_dir: String,
  /// Prefix prepended to the storage name of every upload.
  pub upload_prefix: String,
  /// Public URL prefix under which stored files are served.
  pub media_url: String,
  /// Name of the catalog JSON file in the library root.
  pub catalog_file: String,
  /// Prefix of the URL cache keys.
  pub cache_key_prefix: String,
  /// Strategy used to find stylesheets referencing a saved asset.
  pub back_reference_lookup: BackReferenceLookup,
}

impl Default for FilerConfig {
  fn default() -> Self {
    Self {
      storage_dir: "storage".into(),
      upload_prefix: "filer_public".into(),
      media_url: "/media/".into(),
      catalog_file: "catalog.json".into(),
      cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.into(),
      back_reference_lookup: BackReferenceLookup::Index,
    }
  }
}

impl FilerConfig {
  /// Load configuration from the library root, falling back to defaults.
  ///
  /// A file that cannot be parsed is reported and ignored.
  pub fn discover(root: &Path) -> Self {
    let candidate = root.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Self::default();
    }

    Self::from_path(&candidate).unwrap_or_else(|| {
      tracing::warn!(path = %candidate.display(), "ignoring unreadable configuration, using defaults");
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Directory holding stored files.
  pub fn storage_root(&self, root: &Path) -> PathBuf {
    root.join(&self.storage_dir)
  }

  /// Location of the catalog file.
  pub fn catalog_path(&self, root: &Path) -> PathBuf {
    root.join(&self.catalog_file)
  }
}
