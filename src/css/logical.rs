//! Logical paths: the author-facing hierarchy built from folder names.

use crate::models::{Asset, FolderChain};

/// Join the folder names of a chain into the author-facing folder path.
pub fn logical_folder_path(folder: &FolderChain) -> String {
  folder
    .names()
    .iter()
    .fold(String::new(), |path, name| join(&path, name))
}

/// Logical path of an asset: its folder path followed by its display name.
///
/// Clipboard assets have no logical path.
pub fn logical_file_path(asset: &Asset) -> Option<String> {
  let folder = asset.folder.as_ref()?;
  Some(join(&logical_folder_path(folder), asset.display_name()))
}

/// Join two slash separated paths; an absolute `reference` replaces `base` entirely.
pub fn join(base: &str, reference: &str) -> String {
  if reference.starts_with('/') || base.is_empty() {
    reference.to_string()
  } else if base.ends_with('/') {
    format!("{base}{reference}")
  } else {
    format!("{base}/{reference}")
  }
}

/// Lexically normalise a slash separated path.
///
/// Collapses repeated separators and `.` segments and resolves `..` against the preceding
/// segment. Leading `..` segments of a relative path are kept; on an absolute path they stop
/// at the root. An empty result becomes `.`.
pub fn normalize(path: &str) -> String {
  if path.is_empty() {
    return ".".to_string();
  }

  let root = match path.find(|c: char| c != '/') {
    _ if !path.starts_with('/') => "",
    Some(2) => "//",
    _ => "/",
  };

  let mut segments: Vec<&str> = Vec::new();
  for segment in path.split('/') {
    match segment {
      "" | "." => {}
      ".." if root.is_empty() && segments.last().is_none_or(|last| *last == "..") => {
        segments.push(segment);
      }
      ".." => {
        segments.pop();
      }
      other => segments.push(other),
    }
  }

  let normalized = format!("{root}{}", segments.join("/"));
  if normalized.is_empty() {
    ".".to_string()
  } else {
    normalized
  }
}

/// Directory part of a slash separated path, without the trailing separator.
pub fn dirname(path: &str) -> &str {
  let Some(index) = path.rfind('/') else {
    return "";
  };
  let head = &path[..=index];
  let trimmed = head.trim_end_matches('/');
  if trimmed.is_empty() { head } else { trimmed }
}
