//! Cached logical path to actual URL lookups.

use dashmap::DashMap;

use crate::library::{Library, Storage};
use crate::rewrite::UrlResolver;

/// Default prefix of URL cache keys.
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "filerfile:";

/// Cache of resolved actual URLs, keyed by logical path.
#[derive(Debug)]
pub struct UrlCache {
  prefix: String,
  entries: DashMap<String, String>,
}

impl Default for UrlCache {
  fn default() -> Self {
    Self::new(DEFAULT_CACHE_KEY_PREFIX)
  }
}

impl UrlCache {
  /// Create an empty cache whose keys start with `prefix`.
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      entries: DashMap::new(),
    }
  }

  /// Cache key used for `logical_path`.
  pub fn cache_key(&self, logical_path: &str) -> String {
    format!("{}{}", self.prefix, logical_path)
  }

  /// Cached actual URL for `logical_path`.
  pub fn get(&self, logical_path: &str) -> Option<String> {
    self
      .entries
      .get(&self.cache_key(logical_path))
      .map(|entry| entry.value().clone())
  }

  /// Remember the actual URL of `logical_path`.
  pub fn insert(&self, logical_path: &str, actual_url: impl Into<String>) {
    self
      .entries
      .insert(self.cache_key(logical_path), actual_url.into());
  }

  /// Forget `logical_path`; returns whether an entry was present.
  pub fn invalidate(&self, logical_path: &str) -> bool {
    self.entries.remove(&self.cache_key(logical_path)).is_some()
  }

  /// Number of cached entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Returns `true` when nothing is cached.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Resolves logical paths against a library, going through a [`UrlCache`].
pub struct LibraryResolver<'a, S: Storage> {
  library: &'a Library<S>,
  cache: &'a UrlCache,
}

impl<'a, S: Storage> LibraryResolver<'a, S> {
  /// Resolver over `library` backed by `cache`.
  pub fn new(library: &'a Library<S>, cache: &'a UrlCache) -> Self {
    Self { library, cache }
  }
}

impl<S: Storage> UrlResolver for LibraryResolver<'_, S> {
  fn resolve(&self, logical_path: &str) -> Option<String> {
    if let Some(actual) = self.cache.get(logical_path) {
      return Some(actual);
    }

    let asset = self.library.find_by_logical_path(logical_path)?;
    let actual = self.library.url(asset)?;
    self.cache.insert(logical_path, actual.clone());
    Some(actual)
  }
}
