//! Restricted stylesheet tokenizing used by the rewrite passes.
//!
//! Only `url(...)` tokens and `/* ... */` comments are recognised. There is no CSS parser
//! behind these helpers: nested comments, `@import` rules and `url()` declarations that span
//! several lines are not supported.

mod comments;
mod filters;
pub mod logical;
pub mod markers;

pub use comments::CommentRegions;
pub use filters::{has_network_location, should_preserve_reference};
pub use logical::{logical_file_path, logical_folder_path};
