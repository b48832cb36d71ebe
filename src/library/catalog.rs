//! Persisted catalog of library assets and the stylesheet reference index.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilerError, FilerResult};
use crate::library::ReferenceIndex;
use crate::models::{Asset, AssetId};

/// Everything the library persists besides the stored bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
  /// Identifier handed to the next upload.
  pub next_id: u64,
  /// Assets keyed by identifier.
  pub assets: BTreeMap<AssetId, Asset>,
  /// Logical path to referencing stylesheets.
  pub references: ReferenceIndex,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CatalogFile {
  #[serde(default)]
  next_id: u64,
  #[serde(default)]
  assets: Vec<Asset>,
  #[serde(default)]
  references: ReferenceIndex,
}

impl Catalog {
  /// Load the catalog stored at `path`; a missing file yields an empty catalog.
  pub fn load(path: &Path) -> FilerResult<Self> {
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
      Err(err) => return Err(err.into()),
    };

    let file: CatalogFile =
      serde_json::from_str(&contents).map_err(|source| FilerError::Catalog {
        path: path.to_path_buf(),
        source,
      })?;
    Ok(Self::from(file))
  }

  /// Write the catalog to `path` as prettified JSON.
  pub fn write(&self, path: &Path) -> FilerResult<()> {
    let file = CatalogFile {
      next_id: self.next_id,
      assets: self.assets.values().cloned().collect(),
      references: self.references.clone(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| FilerError::CatalogWrite {
      path: path.to_path_buf(),
      source,
    })?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
  }
}

impl From<CatalogFile> for Catalog {
  fn from(file: CatalogFile) -> Self {
    let assets: BTreeMap<AssetId, Asset> = file
      .assets
      .into_iter()
      .map(|asset| (asset.id, asset))
      .collect();
    let highest = assets.keys().next_back().map_or(0, |id| id.0 + 1);

    Self {
      next_id: file.next_id.max(highest),
      assets,
      references: file.references,
    }
  }
}
