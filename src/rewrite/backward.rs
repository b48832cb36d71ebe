//! Backward pass: refresh the actual URL recorded in front of a logical marker.

use regex::{NoExpand, Regex};

use crate::css::markers::logical_url_marker;

/// Identifies the asset whose references must be refreshed.
pub struct BackwardContext<'a> {
  /// Logical path of the saved asset.
  pub logical_path: &'a str,
  /// Its current actual URL.
  pub actual_url: &'a str,
}

/// Compiled back-reference update for one saved asset, reusable across many stylesheets.
#[derive(Debug, Clone)]
pub struct BackReference {
  marker: String,
  pattern: Regex,
  replacement: String,
}

impl BackReference {
  /// Build the update for the asset described by `context`.
  pub fn new(context: &BackwardContext<'_>) -> Self {
    let marker = logical_url_marker(context.logical_path);
    let pattern = Regex::new(&format!(r"\burl\([^)]*\) {}", regex::escape(&marker)))
      .expect("invalid back-reference regex");
    let replacement = format!("url('{}') {}", context.actual_url, marker);

    Self {
      marker,
      pattern,
      replacement,
    }
  }

  /// Exact marker comment searched for.
  pub fn marker(&self) -> &str {
    &self.marker
  }

  /// Replace the `url(...)` in front of every matching marker.
  ///
  /// Returns `None` when the stylesheet does not reference the asset or already carries its
  /// current actual URL.
  pub fn apply(&self, content: &str) -> Option<String> {
    let updated = self
      .pattern
      .replace_all(content, NoExpand(&self.replacement));
    (updated != content).then(|| updated.into_owned())
  }
}

/// Refresh every reference to `context.logical_path` in `content`.
pub fn rewrite_backward(content: &str, context: &BackwardContext<'_>) -> String {
  BackReference::new(context)
    .apply(content)
    .unwrap_or_else(|| content.to_string())
}
