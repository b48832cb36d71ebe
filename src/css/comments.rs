use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn comment_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("invalid comment regex"))
}

/// Byte ranges of every `/* ... */` comment in a stylesheet.
///
/// Comments do not nest: the first `*/` closes the nearest preceding `/*`. An unterminated
/// `/*` produces no region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentRegions {
  regions: Vec<Range<usize>>,
}

impl CommentRegions {
  /// Scan `content` for comment regions.
  pub fn scan(content: &str) -> Self {
    let regions = comment_pattern()
      .find_iter(content)
      .map(|found| found.range())
      .collect();
    Self { regions }
  }

  /// Returns `true` when `span` intersects any comment, even partially.
  pub fn overlaps(&self, span: &Range<usize>) -> bool {
    let first_candidate = self
      .regions
      .partition_point(|region| region.end <= span.start);
    self
      .regions
      .get(first_candidate)
      .is_some_and(|region| region.start < span.end)
  }

  /// Ordered, non-overlapping regions.
  pub fn as_slice(&self) -> &[Range<usize>] {
    &self.regions
  }
}

#[cfg(test)]
mod tests {
  use super::CommentRegions;

  #[test]
  fn finds_non_nested_regions_in_order() {
    let css = "a {} /* one */ b {} /* two /* still two */ */";
    let regions = CommentRegions::scan(css);
    assert_eq!(regions.as_slice().len(), 2);
    assert_eq!(&css[regions.as_slice()[0].clone()], "/* one */");
    assert_eq!(&css[regions.as_slice()[1].clone()], "/* two /* still two */");
  }

  #[test]
  fn comments_may_span_lines() {
    let css = "/*\n * header\n */\nbody {}";
    let regions = CommentRegions::scan(css);
    assert_eq!(regions.as_slice(), &[0..16]);
  }

  #[test]
  fn unterminated_comment_is_ignored() {
    assert!(CommentRegions::scan("a { /* open").as_slice().is_empty());
  }

  #[test]
  fn detects_partial_overlap() {
    let regions = CommentRegions::scan("0123/*67*/0123");
    assert!(regions.overlaps(&(5..6)));
    assert!(regions.overlaps(&(0..5)));
    assert!(regions.overlaps(&(9..12)));
    assert!(!regions.overlaps(&(0..4)));
    assert!(!regions.overlaps(&(10..14)));
  }
}
