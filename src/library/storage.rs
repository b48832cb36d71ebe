//! Storage backends holding the physical bytes of library assets.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Physical storage for asset bytes.
///
/// A save never overwrites: when `name` is taken the backend picks an available name and
/// returns it, so callers must always keep the returned name.
pub trait Storage {
  /// Read the bytes stored under `name`.
  fn open(&self, name: &str) -> io::Result<Vec<u8>>;
  /// Store `content` under `name` or the next available name, returning the name used.
  fn save(&mut self, name: &str, content: &[u8]) -> io::Result<String>;
  /// Remove the file stored under `name`.
  fn delete(&mut self, name: &str) -> io::Result<()>;
  /// Whether something is stored under `name`.
  fn exists(&self, name: &str) -> bool;
  /// Public URL serving the file stored under `name`.
  fn url(&self, name: &str) -> String;
}

/// First name derived from `name` for which `is_taken` returns `false`.
///
/// Candidates append `_1`, `_2`, ... to the file stem: `css/site.css` becomes `css/site_1.css`.
pub fn available_name(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
  if !is_taken(name) {
    return name.to_string();
  }

  let (directory, file_name) = match name.rfind('/') {
    Some(index) => name.split_at(index + 1),
    None => ("", name),
  };
  let (stem, extension) = match file_name.rfind('.') {
    Some(index) if index > 0 => file_name.split_at(index),
    _ => (file_name, ""),
  };

  let mut counter = 1;
  loop {
    let candidate = format!("{directory}{stem}_{counter}{extension}");
    if !is_taken(&candidate) {
      return candidate;
    }
    counter += 1;
  }
}

fn public_url(base_url: &str, name: &str) -> String {
  format!(
    "{}/{}",
    base_url.trim_end_matches('/'),
    name.trim_start_matches('/')
  )
}

/// Volatile storage keeping every file in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  base_url: String,
  files: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
  /// Create an empty store serving files below `base_url`.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      files: BTreeMap::new(),
    }
  }
}

impl Storage for MemoryStorage {
  fn open(&self, name: &str) -> io::Result<Vec<u8>> {
    self.files.get(name).cloned().ok_or_else(|| {
      io::Error::new(ErrorKind::NotFound, format!("{name} is not stored"))
    })
  }

  fn save(&mut self, name: &str, content: &[u8]) -> io::Result<String> {
    let stored = available_name(name, |candidate| self.files.contains_key(candidate));
    self.files.insert(stored.clone(), content.to_vec());
    Ok(stored)
  }

  fn delete(&mut self, name: &str) -> io::Result<()> {
    self.files.remove(name);
    Ok(())
  }

  fn exists(&self, name: &str) -> bool {
    self.files.contains_key(name)
  }

  fn url(&self, name: &str) -> String {
    public_url(&self.base_url, name)
  }
}

/// Storage rooted in a directory on disk.
#[derive(Debug, Clone)]
pub struct FsStorage {
  root: PathBuf,
  base_url: String,
}

impl FsStorage {
  /// Serve files kept below `root` from `base_url`.
  pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      base_url: base_url.into(),
    }
  }

  /// Directory holding the stored files.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path(&self, name: &str) -> PathBuf {
    self.root.join(name.trim_start_matches('/'))
  }
}

impl Storage for FsStorage {
  fn open(&self, name: &str) -> io::Result<Vec<u8>> {
    fs::read(self.path(name))
  }

  fn save(&mut self, name: &str, content: &[u8]) -> io::Result<String> {
    let stored = available_name(name, |candidate| self.path(candidate).exists());
    let destination = self.path(&stored);
    if let Some(parent) = destination.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(&destination, content)?;
    Ok(stored)
  }

  fn delete(&mut self, name: &str) -> io::Result<()> {
    match fs::remove_file(self.path(name)) {
      Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
      result => result,
    }
  }

  fn exists(&self, name: &str) -> bool {
    self.path(name).is_file()
  }

  fn url(&self, name: &str) -> String {
    public_url(&self.base_url, name)
  }
}
