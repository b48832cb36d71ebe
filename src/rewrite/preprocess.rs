//! Response-time stylesheet rewriting for serving an asset by its logical path.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::css::logical::{dirname, join, normalize};
use crate::error::{FilerError, FilerResult};
use crate::library::{Library, Storage};
use crate::models::CSS_SUFFIX;
use crate::rewrite::UrlResolver;

fn quoted_url_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r#"url\(['"]([^']+)['"]\)"#).expect("invalid quoted url regex"))
}

/// Serve the asset filed under `path`, rewriting quoted `url(...)` references on the fly.
///
/// References are resolved relative to the directory of `path`. Nothing is persisted and no
/// comment or absolute-URL handling applies; references that do not resolve are left as
/// written. A missing stylesheet is [`FilerError::NotFound`], any other missing path yields an
/// empty body. Content that is not UTF-8 is returned unchanged.
pub fn css_preprocessor<S: Storage>(
  library: &Library<S>,
  resolver: &dyn UrlResolver,
  path: &str,
) -> FilerResult<Vec<u8>> {
  let Some(target) = library.find_by_logical_path(path) else {
    if path.ends_with(CSS_SUFFIX) {
      return Err(FilerError::NotFound(path.to_string()));
    }
    return Ok(Vec::new());
  };

  let bytes = library.read_content(target)?;
  let content = match String::from_utf8(bytes) {
    Ok(content) => content,
    Err(err) => return Ok(err.into_bytes()),
  };

  let directory = dirname(path);
  let served = quoted_url_pattern().replace_all(&content, |caps: &Captures<'_>| {
    let logical = normalize(&join(directory, &caps[1]));
    match resolver.resolve(&logical) {
      Some(actual) => format!("url('{actual}')"),
      None => caps[0].to_string(),
    }
  });

  Ok(served.into_owned().into_bytes())
}
