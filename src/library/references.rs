use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::AssetId;

/// Reverse index from a logical path to the stylesheets referencing it.
///
/// Updated whenever a stylesheet is rewritten, so the back-reference pass only visits the
/// stylesheets that actually mention a saved asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceIndex {
  targets: BTreeMap<String, BTreeSet<AssetId>>,
}

impl ReferenceIndex {
  /// Replace the recorded references of `stylesheet` with `logical_paths`.
  pub fn record<I>(&mut self, stylesheet: AssetId, logical_paths: I)
  where
    I: IntoIterator<Item = String>,
  {
    self.forget(stylesheet);
    for path in logical_paths {
      self.targets.entry(path).or_default().insert(stylesheet);
    }
  }

  /// Drop every reference held by `stylesheet`.
  pub fn forget(&mut self, stylesheet: AssetId) {
    self.targets.retain(|_, referrers| {
      referrers.remove(&stylesheet);
      !referrers.is_empty()
    });
  }

  /// Stylesheets referencing `logical_path`, in id order.
  pub fn referencing(&self, logical_path: &str) -> Vec<AssetId> {
    self
      .targets
      .get(logical_path)
      .map(|referrers| referrers.iter().copied().collect())
      .unwrap_or_default()
  }

  /// Logical paths referenced by `stylesheet`.
  pub fn targets_of(&self, stylesheet: AssetId) -> BTreeSet<&str> {
    self
      .targets
      .iter()
      .filter(|(_, referrers)| referrers.contains(&stylesheet))
      .map(|(path, _)| path.as_str())
      .collect()
  }

  /// Number of distinct logical paths referenced by any stylesheet.
  pub fn len(&self) -> usize {
    self.targets.len()
  }

  /// Returns `true` when no stylesheet references anything.
  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }
}
