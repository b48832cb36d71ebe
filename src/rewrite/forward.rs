//! Forward pass: authored `url(...)` references to actual URLs plus logical markers.

use std::collections::{BTreeSet, HashMap};

use regex::Captures;

use crate::css::CommentRegions;
use crate::css::logical::{join, normalize};
use crate::css::markers::{self, ALREADY_RESOLVED_MARKER};
use crate::css::should_preserve_reference;
use crate::rewrite::UrlResolver;

/// Inputs of a forward rewrite.
pub struct ForwardContext<'a> {
  /// Logical folder path of the stylesheet; relative references are joined onto it.
  pub folder_path: &'a str,
  /// Source of actual URLs.
  pub resolver: &'a dyn UrlResolver,
}

/// Result of a forward rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
  /// The content starts with the already-resolved sentinel and was left alone.
  AlreadyResolved,
  /// The content was rewritten.
  Rewritten {
    /// New stylesheet text, starting with the sentinel line.
    content: String,
    /// Logical paths the stylesheet now references.
    references: BTreeSet<String>,
  },
}

/// Rewrite every `url(...)` outside comments into `url('<actual>') /* logicalurl('<logical>') */`.
///
/// References with a network location, data URIs, fragments and references inside comments
/// are copied verbatim. A reference already followed by a logical marker is re-resolved from
/// the marker instead of being wrapped a second time. Each logical path is resolved once per
/// call, however often it occurs.
pub fn rewrite_forward(content: &str, context: &ForwardContext<'_>) -> ForwardOutcome {
  if markers::is_resolved(content) {
    return ForwardOutcome::AlreadyResolved;
  }

  let comments = CommentRegions::scan(content);
  let mut replacements: HashMap<String, String> = HashMap::new();
  let mut references = BTreeSet::new();

  let rewritten = markers::marked_url_pattern().replace_all(content, |caps: &Captures<'_>| {
    let original = caps.get(0).map_or("", |found| found.as_str());
    let Some(token) = caps.name("url") else {
      return original.to_string();
    };
    if comments.overlaps(&token.range()) {
      return original.to_string();
    }

    let reference = caps
      .name("raw")
      .map_or("", |raw| raw.as_str())
      .trim_matches(|c: char| matches!(c, '\'' | '"' | ' '));

    let logical_target = match caps.name("logical") {
      Some(logical) => logical.as_str().to_string(),
      None if should_preserve_reference(reference) => return original.to_string(),
      None => normalize(&join(context.folder_path, reference)),
    };

    references.insert(logical_target.clone());
    replacements
      .entry(logical_target)
      .or_insert_with_key(|target| {
        let actual = context.resolver.resolve(target).unwrap_or_else(|| {
          tracing::debug!(logical = %target, "no asset filed under logical path, keeping reference");
          reference.to_string()
        });
        markers::resource_url(&actual, target)
      })
      .clone()
  });

  ForwardOutcome::Rewritten {
    content: format!("{ALREADY_RESOLVED_MARKER}\n{rewritten}"),
    references,
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  fn rewrite_with<F>(content: &str, folder_path: &str, resolve: F) -> ForwardOutcome
  where
    F: Fn(&str) -> Option<String>,
  {
    rewrite_forward(content, &ForwardContext {
      folder_path,
      resolver: &resolve,
    })
  }

  fn rewritten(outcome: ForwardOutcome) -> (String, BTreeSet<String>) {
    match outcome {
      ForwardOutcome::Rewritten {
        content,
        references,
      } => (content, references),
      ForwardOutcome::AlreadyResolved => panic!("expected a rewrite"),
    }
  }

  fn public_url(path: &str) -> Option<String> {
    Some(format!("filer_public/{}", path.rsplit('/').next().unwrap_or(path)))
  }

  #[test]
  fn resolves_relative_reference_against_folder() {
    let (content, references) = rewritten(rewrite_with(
      ".nice { background: url('../img/x.png'); }",
      "a/b",
      |path: &str| (path == "a/img/x.png").then(|| "U1".to_string()),
    ));

    assert_eq!(
      content,
      "/* Filer urls already resolved */\n.nice { background: url('U1') /* logicalurl('a/img/x.png') */; }"
    );
    assert!(references.contains("a/img/x.png"));
  }

  #[test]
  fn second_pass_is_a_no_op() {
    let original = "a { background: url(\"x.png\") }";
    let (once, _) = rewritten(rewrite_with(original, "media", public_url));
    assert_eq!(
      rewrite_with(&once, "media", public_url),
      ForwardOutcome::AlreadyResolved
    );
  }

  #[test]
  fn leaves_commented_urls_untouched() {
    let (content, references) = rewritten(rewrite_with(
      "a { /* url('x.png') */ } b { background: url('x.png') }",
      "media",
      public_url,
    ));

    assert!(content.contains("a { /* url('x.png') */ }"));
    assert!(content.contains(
      "b { background: url('filer_public/x.png') /* logicalurl('media/x.png') */ }"
    ));
    assert_eq!(references.len(), 1);
  }

  #[test]
  fn passes_absolute_urls_through() {
    let css = "a { background: url('http://cdn.example.com/x.png') } b { background: url(//cdn.example.com/y.png) }";
    let (content, references) = rewritten(rewrite_with(css, "media", |_: &str| {
      panic!("absolute urls must not be resolved")
    }));

    assert_eq!(content, format!("{ALREADY_RESOLVED_MARKER}\n{css}"));
    assert!(references.is_empty());
  }

  #[test]
  fn memoizes_repeated_references() {
    let calls = Cell::new(0);
    let resolver = |path: &str| {
      calls.set(calls.get() + 1);
      public_url(path)
    };
    let css = "a { background: url(x.png) }\nb { background: url('x.png') }\nc { background: url( \"x.png\" ) }";
    let (content, _) = rewritten(rewrite_with(css, "media", resolver));

    assert_eq!(calls.get(), 1);
    assert_eq!(
      content
        .matches("url('filer_public/x.png') /* logicalurl('media/x.png') */")
        .count(),
      3
    );
  }

  #[test]
  fn keeps_reference_when_target_is_unknown() {
    let (content, references) = rewritten(rewrite_with(
      "a { background: url('icons/missing.svg') }",
      "media",
      |_: &str| None,
    ));

    assert!(content.contains("url('icons/missing.svg') /* logicalurl('media/icons/missing.svg') */"));
    assert!(references.contains("media/icons/missing.svg"));
  }

  #[test]
  fn refreshes_existing_pairs_without_nesting_markers() {
    let css = "a { background: url('old/x.png') /* logicalurl('media/x.png') */ }";
    let (content, _) = rewritten(rewrite_with(css, "elsewhere", |_: &str| {
      Some("new/x.png".to_string())
    }));

    assert_eq!(
      content,
      format!("{ALREADY_RESOLVED_MARKER}\na {{ background: url('new/x.png') /* logicalurl('media/x.png') */ }}")
    );
  }

  #[test]
  fn skips_data_uris() {
    let css = "a { background: url(data:image/gif;base64,R0lGOD) }";
    let (content, _) = rewritten(rewrite_with(css, "media", public_url));
    assert!(content.ends_with(css));
  }
}
