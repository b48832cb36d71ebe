use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn preserved_reference_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"^#").expect("invalid fragment regex"),
      ]
    })
    .as_slice()
}

/// Returns `true` when a reference carries a network location, e.g. `http://cdn/x.png` or
/// the protocol-relative `//cdn/x.png`.
pub fn has_network_location(reference: &str) -> bool {
  if reference.starts_with("//") {
    return reference.len() > 2 && !reference[2..].starts_with('/');
  }

  Url::parse(reference)
    .ok()
    .and_then(|url| url.host_str().map(|host| !host.is_empty()))
    .unwrap_or(false)
}

/// Determine whether a `url(...)` reference must be copied verbatim by the rewrite pass.
///
/// Absolute URLs already point at their final location. Inline data URIs, fragment-only
/// references and empty references do not name a library asset at all.
pub fn should_preserve_reference(reference: &str) -> bool {
  reference.is_empty()
    || has_network_location(reference)
    || preserved_reference_patterns()
      .iter()
      .any(|pattern| pattern.is_match(reference))
}
