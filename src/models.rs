//! Data structures describing assets held by the file library.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix identifying stylesheet assets.
pub const CSS_SUFFIX: &str = ".css";

/// Stable identifier of an asset inside the library catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Ordered folder names from the library root down to the containing folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderChain(Vec<String>);

impl FolderChain {
  /// Build a chain from folder names, outermost first.
  pub fn new<I, N>(names: I) -> Self
  where
    I: IntoIterator<Item = N>,
    N: Into<String>,
  {
    Self(names.into_iter().map(Into::into).collect())
  }

  /// Parse a slash separated folder path such as `media/images`.
  pub fn parse(path: &str) -> Self {
    Self::new(path.split('/').filter(|segment| !segment.is_empty()))
  }

  /// Folder names, outermost first.
  pub fn names(&self) -> &[String] {
    &self.0
  }
}

/// Backing bytes of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileContent {
  /// Uploaded bytes not yet handed to the storage backend.
  Pending(Vec<u8>),
  /// Name of the file inside the storage backend.
  Stored(String),
}

/// A file entity of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
  /// Catalog identifier.
  pub id: AssetId,
  /// Optional display name chosen by the author.
  #[serde(default)]
  pub name: Option<String>,
  /// Filename the asset was uploaded with.
  pub original_filename: String,
  /// Containing folder chain; `None` means the asset sits in the clipboard.
  #[serde(default)]
  pub folder: Option<FolderChain>,
  /// Pending or stored content.
  pub file: FileContent,
  /// Hex content digest of the current bytes.
  #[serde(default)]
  pub sha: String,
  /// Byte length of the current content.
  #[serde(default)]
  pub size: u64,
}

impl Asset {
  /// Name used for logical paths: the display name, or the original filename when unset.
  pub fn display_name(&self) -> &str {
    match self.name.as_deref() {
      Some(name) if !name.is_empty() => name,
      _ => &self.original_filename,
    }
  }

  /// Whether the asset is a stylesheet, judged by its display name.
  pub fn is_css(&self) -> bool {
    self.display_name().ends_with(CSS_SUFFIX)
  }

  /// Assets without a folder are not filed under any logical path yet.
  pub fn is_in_clipboard(&self) -> bool {
    self.folder.is_none()
  }

  /// Storage name when the content has already been persisted.
  pub fn stored_name(&self) -> Option<&str> {
    match &self.file {
      FileContent::Stored(name) => Some(name),
      FileContent::Pending(_) => None,
    }
  }
}
