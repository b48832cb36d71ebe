//! Text rewrite passes applied to stylesheets stored in the library.
//!
//! The passes are plain functions over text: the forward pass turns authored references into
//! actual URLs, the backward pass refreshes the actual URL recorded for one logical path.
//! Wiring them into the save pipeline happens in [`crate::hooks`].

pub mod backward;
pub mod forward;
pub mod integrity;
pub mod preprocess;

pub use backward::{BackReference, BackwardContext, rewrite_backward};
pub use forward::{ForwardContext, ForwardOutcome, rewrite_forward};
pub use integrity::{content_digest, rewrite_content};
pub use preprocess::css_preprocessor;

/// Maps a logical path to the current actual URL of the asset filed under it.
pub trait UrlResolver {
  /// Returns `None` when no asset is filed under `logical_path`.
  fn resolve(&self, logical_path: &str) -> Option<String>;
}

impl<F> UrlResolver for F
where
  F: Fn(&str) -> Option<String>,
{
  fn resolve(&self, logical_path: &str) -> Option<String> {
    self(logical_path)
  }
}
