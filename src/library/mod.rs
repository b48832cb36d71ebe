//! The file library: asset catalog, storage backend and save pipeline.
//!
//! Saving an asset runs every registered [`SaveHook`] before the catalog commit and again
//! after it. Nothing is registered implicitly; the host decides which hooks to install.

use std::io;
use std::sync::Arc;

use crate::css::logical_file_path;
use crate::css::markers;
use crate::error::{FilerError, FilerResult};
use crate::models::{Asset, AssetId, CSS_SUFFIX, FileContent, FolderChain};
use crate::rewrite::content_digest;

mod cache;
mod catalog;
mod references;
mod storage;

pub use cache::{DEFAULT_CACHE_KEY_PREFIX, LibraryResolver, UrlCache};
pub use catalog::Catalog;
pub use references::ReferenceIndex;
pub use storage::{FsStorage, MemoryStorage, Storage, available_name};

/// Extension point invoked around every save.
pub trait SaveHook<S: Storage> {
  /// Runs before the asset is committed; may mutate it.
  fn pre_save(&self, library: &mut Library<S>, asset: &mut Asset) -> FilerResult<()>;
  /// Runs once the asset is committed to the catalog.
  fn post_save(&self, library: &mut Library<S>, asset: &Asset) -> FilerResult<()>;
}

/// Hierarchical file library over a storage backend.
pub struct Library<S: Storage> {
  storage: S,
  catalog: Catalog,
  upload_prefix: String,
  hooks: Vec<Arc<dyn SaveHook<S>>>,
}

impl<S: Storage> Library<S> {
  /// Empty library storing uploads below `upload_prefix`.
  pub fn new(storage: S, upload_prefix: impl Into<String>) -> Self {
    Self::with_catalog(storage, upload_prefix, Catalog::default())
  }

  /// Library restored from a previously persisted catalog.
  pub fn with_catalog(storage: S, upload_prefix: impl Into<String>, catalog: Catalog) -> Self {
    Self {
      storage,
      catalog,
      upload_prefix: upload_prefix.into(),
      hooks: Vec::new(),
    }
  }

  /// Register a hook; hooks run in registration order.
  pub fn register_hook(&mut self, hook: Arc<dyn SaveHook<S>>) {
    self.hooks.push(hook);
  }

  /// Storage backend.
  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Mutable storage backend.
  pub fn storage_mut(&mut self) -> &mut S {
    &mut self.storage
  }

  /// Persistable catalog state.
  pub fn catalog(&self) -> &Catalog {
    &self.catalog
  }

  /// Stylesheet reference index.
  pub fn references(&self) -> &ReferenceIndex {
    &self.catalog.references
  }

  /// Mutable stylesheet reference index.
  pub fn references_mut(&mut self) -> &mut ReferenceIndex {
    &mut self.catalog.references
  }

  /// Committed asset with identifier `id`.
  pub fn get(&self, id: AssetId) -> Option<&Asset> {
    self.catalog.assets.get(&id)
  }

  /// Owned copy of a committed asset, ready to be modified and saved again.
  pub fn asset(&self, id: AssetId) -> FilerResult<Asset> {
    self.get(id).cloned().ok_or(FilerError::AssetNotFound(id))
  }

  /// Every committed asset, in identifier order.
  pub fn assets(&self) -> impl Iterator<Item = &Asset> {
    self.catalog.assets.values()
  }

  /// Identifiers of committed stylesheets, judged by their original filename.
  pub fn css_assets(&self) -> Vec<AssetId> {
    self
      .assets()
      .filter(|asset| asset.original_filename.ends_with(CSS_SUFFIX))
      .map(|asset| asset.id)
      .collect()
  }

  /// Committed asset filed under `logical_path`.
  pub fn find_by_logical_path(&self, logical_path: &str) -> Option<&Asset> {
    self
      .assets()
      .find(|asset| logical_file_path(asset).as_deref() == Some(logical_path))
  }

  /// Actual URL of a stored asset.
  pub fn url(&self, asset: &Asset) -> Option<String> {
    asset.stored_name().map(|name| self.storage.url(name))
  }

  /// Current bytes of an asset, pending or stored.
  pub fn read_content(&self, asset: &Asset) -> io::Result<Vec<u8>> {
    match &asset.file {
      FileContent::Pending(content) => Ok(content.clone()),
      FileContent::Stored(name) => self.storage.open(name),
    }
  }

  /// Create a new, not yet saved asset from uploaded bytes.
  pub fn upload(&mut self, filename: &str, folder: Option<FolderChain>, content: Vec<u8>) -> Asset {
    let id = AssetId(self.catalog.next_id);
    self.catalog.next_id += 1;

    Asset {
      id,
      name: None,
      original_filename: filename.to_string(),
      folder,
      sha: content_digest(&content),
      size: content.len() as u64,
      file: FileContent::Pending(content),
    }
  }

  /// Run the save pipeline for `asset` and commit it.
  pub fn save(&mut self, mut asset: Asset) -> FilerResult<AssetId> {
    let hooks = self.hooks.clone();
    for hook in &hooks {
      hook.pre_save(self, &mut asset)?;
    }

    self.commit(&mut asset)?;

    for hook in &hooks {
      hook.post_save(self, &asset)?;
    }
    Ok(asset.id)
  }

  /// File an asset under `folder`, or move it to the clipboard with `None`, and save it.
  pub fn move_to(&mut self, id: AssetId, folder: Option<FolderChain>) -> FilerResult<()> {
    let mut asset = self.asset(id)?;
    asset.folder = folder;
    self.save(asset)?;
    Ok(())
  }

  /// Replace the bytes of an asset with a fresh upload and save it.
  pub fn replace_content(&mut self, id: AssetId, content: Vec<u8>) -> FilerResult<()> {
    let mut asset = self.asset(id)?;
    asset.file = FileContent::Pending(content);
    self.save(asset)?;
    Ok(())
  }

  /// Rebuild the reference index from the logical markers of every stored stylesheet.
  ///
  /// Returns the number of stylesheets that could be read.
  pub fn reindex(&mut self) -> usize {
    let mut index = ReferenceIndex::default();
    let mut indexed = 0;

    for asset in self.assets() {
      if !asset.original_filename.ends_with(CSS_SUFFIX) {
        continue;
      }
      let content = match self.read_content(asset) {
        Ok(content) => content,
        Err(err) => {
          tracing::warn!(asset = %asset.id, error = %err, "skipping unreadable stylesheet");
          continue;
        }
      };
      index.record(
        asset.id,
        markers::logical_targets(&String::from_utf8_lossy(&content)),
      );
      indexed += 1;
    }

    self.catalog.references = index;
    indexed
  }

  fn commit(&mut self, asset: &mut Asset) -> FilerResult<()> {
    let previous = self
      .get(asset.id)
      .and_then(Asset::stored_name)
      .map(str::to_string);

    if let FileContent::Pending(content) = &asset.file {
      let target = format!(
        "{}/{}",
        self.upload_prefix.trim_end_matches('/'),
        asset.original_filename
      );
      let stored = self.storage.save(&target, content)?;
      let sha = content_digest(content);
      let size = content.len() as u64;
      asset.file = FileContent::Stored(stored);
      asset.sha = sha;
      asset.size = size;
    }

    if let Some(previous) = previous
      && asset.stored_name() != Some(previous.as_str())
      && self.storage.exists(&previous)
      && let Err(err) = self.storage.delete(&previous)
    {
      tracing::warn!(asset = %asset.id, name = %previous, error = %err, "failed to remove superseded file");
    }

    self.catalog.assets.insert(asset.id, asset.clone());
    Ok(())
  }
}
