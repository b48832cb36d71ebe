#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod css;
pub mod error;
pub mod hooks;
pub mod library;
pub mod models;
pub mod rewrite;

pub use config::{BackReferenceLookup, FilerConfig};
pub use error::{FilerError, FilerResult};
pub use hooks::CssUrlHooks;
pub use library::{FsStorage, Library, MemoryStorage, SaveHook, Storage, UrlCache};
pub use models::{Asset, AssetId, FileContent, FolderChain};
