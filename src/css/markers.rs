//! The micro-format persisted inside rewritten stylesheets.
//!
//! A rewritten stylesheet starts with [`ALREADY_RESOLVED_MARKER`] on its own line, and every
//! rewritten reference becomes `url('<actual>') /* logicalurl('<logical>') */`. Both shapes are
//! stored in the content itself and must stay byte-for-byte stable across versions.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

/// Sentinel placed at the very start of a stylesheet whose URLs have been resolved.
pub const ALREADY_RESOLVED_MARKER: &str = "/* Filer urls already resolved */";

/// Comment recording the logical path behind a rewritten URL.
pub fn logical_url_marker(logical_path: &str) -> String {
  format!("/* logicalurl('{logical_path}') */")
}

/// Rewritten reference: the actual URL followed by its logical marker.
pub fn resource_url(actual_url: &str, logical_path: &str) -> String {
  format!("url('{actual_url}') {}", logical_url_marker(logical_path))
}

/// Whether the stylesheet already went through the forward rewrite.
pub fn is_resolved(content: &str) -> bool {
  content.starts_with(ALREADY_RESOLVED_MARKER)
}

/// Matches a `url(...)` token together with the logical marker that may follow it.
///
/// Named groups: `url` (the token), `raw` (its argument) and `logical` (the marker path, when
/// a marker is present).
pub fn marked_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?P<url>\burl\((?P<raw>[^)]*)\))(?: /\* logicalurl\('(?P<logical>[^']*)'\) \*/)?")
      .expect("invalid marked url regex")
  })
}

fn logical_marker_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"\burl\([^)]*\) /\* logicalurl\('([^']*)'\) \*/")
      .expect("invalid logical marker regex")
  })
}

/// Logical paths of every marked reference in a stylesheet.
pub fn logical_targets(content: &str) -> BTreeSet<String> {
  logical_marker_pattern()
    .captures_iter(content)
    .filter_map(|caps| caps.get(1))
    .map(|path| path.as_str().to_string())
    .collect()
}
