//! Save hooks keeping stylesheet URLs in sync with the library.
//!
//! Authors write logical URLs such as `../images/misc/foobar.png`; the library serves files
//! from actual URLs such as `/media/filer_public/foobar.png`. Before a stylesheet is committed
//! its logical URLs are rewritten to actual ones, each followed by a comment recording the
//! logical path:
//!
//! ```css
//! .button { background: url('/media/filer_public/foobar.png') /* logicalurl('media/images/misc/foobar.png') */; }
//! ```
//!
//! After any other asset is committed, every stylesheet whose comment names that asset gets
//! the new actual URL, and the cached URL lookup for the asset is invalidated.

use std::sync::Arc;

use crate::config::{BackReferenceLookup, FilerConfig};
use crate::css::{logical_file_path, logical_folder_path, markers};
use crate::error::FilerResult;
use crate::library::{Library, LibraryResolver, SaveHook, Storage, UrlCache};
use crate::models::Asset;
use crate::rewrite::{
  BackReference, BackwardContext, ForwardContext, ForwardOutcome, rewrite_content, rewrite_forward,
};

/// Forward rewrite, back-reference update and cache invalidation as one hook.
#[derive(Debug)]
pub struct CssUrlHooks {
  cache: Arc<UrlCache>,
  lookup: BackReferenceLookup,
}

impl CssUrlHooks {
  /// Hooks sharing `cache` with the rest of the host.
  pub fn new(cache: Arc<UrlCache>, lookup: BackReferenceLookup) -> Self {
    Self { cache, lookup }
  }

  /// Register the hooks on `library` and return the URL cache they use.
  pub fn install<S: Storage>(library: &mut Library<S>, config: &FilerConfig) -> Arc<UrlCache> {
    let cache = Arc::new(UrlCache::new(config.cache_key_prefix.clone()));
    library.register_hook(Arc::new(Self::new(
      cache.clone(),
      config.back_reference_lookup,
    )));
    cache
  }

  /// URL cache shared with the resolver.
  pub fn cache(&self) -> &Arc<UrlCache> {
    &self.cache
  }

  fn resolve_resource_urls<S: Storage>(
    &self,
    library: &mut Library<S>,
    stylesheet: &mut Asset,
  ) -> FilerResult<()> {
    if !stylesheet.is_css() {
      return Ok(());
    }
    let Some(folder) = stylesheet.folder.as_ref() else {
      tracing::debug!(asset = %stylesheet.id, "stylesheet is in the clipboard, not resolving urls");
      return Ok(());
    };
    let folder_path = logical_folder_path(folder);

    let bytes = library.read_content(stylesheet)?;
    let Ok(content) = String::from_utf8(bytes) else {
      tracing::warn!(asset = %stylesheet.id, "stylesheet is not valid UTF-8, not resolving urls");
      return Ok(());
    };

    let outcome = {
      let resolver = LibraryResolver::new(library, &self.cache);
      rewrite_forward(&content, &ForwardContext {
        folder_path: &folder_path,
        resolver: &resolver,
      })
    };

    match outcome {
      ForwardOutcome::AlreadyResolved => {
        tracing::debug!(asset = %stylesheet.id, "stylesheet urls already resolved");
        library
          .references_mut()
          .record(stylesheet.id, markers::logical_targets(&content));
      }
      ForwardOutcome::Rewritten {
        content,
        references,
      } => {
        rewrite_content(stylesheet, library.storage_mut(), content.as_bytes())?;
        tracing::info!(
          asset = %stylesheet.id,
          references = references.len(),
          "resolved stylesheet urls"
        );
        library.references_mut().record(stylesheet.id, references);
      }
    }
    Ok(())
  }

  fn update_referencing_css_files<S: Storage>(
    &self,
    library: &mut Library<S>,
    resource: &Asset,
  ) -> FilerResult<()> {
    if resource.is_css() {
      return Ok(());
    }
    let Some(logical_path) = logical_file_path(resource) else {
      return Ok(());
    };
    let Some(actual_url) = library.url(resource) else {
      return Ok(());
    };

    let reference = BackReference::new(&BackwardContext {
      logical_path: &logical_path,
      actual_url: &actual_url,
    });
    let candidates = match self.lookup {
      BackReferenceLookup::Index => library.references().referencing(&logical_path),
      BackReferenceLookup::Scan => library.css_assets(),
    };

    for id in candidates {
      let Some(mut stylesheet) = library.get(id).cloned() else {
        continue;
      };
      let content = match library.read_content(&stylesheet) {
        Ok(content) => content,
        Err(err) => {
          tracing::warn!(
            asset = %id,
            logical = %logical_path,
            error = %err,
            "skipping stylesheet whose file cannot be read"
          );
          continue;
        }
      };
      let Ok(content) = String::from_utf8(content) else {
        tracing::warn!(asset = %id, "skipping stylesheet that is not valid UTF-8");
        continue;
      };

      if let Some(updated) = reference.apply(&content) {
        rewrite_content(&mut stylesheet, library.storage_mut(), updated.as_bytes())?;
        tracing::info!(asset = %id, logical = %logical_path, url = %actual_url, "updated stylesheet reference");
        library.save(stylesheet)?;
      }
    }
    Ok(())
  }

  fn clear_urls_cache(&self, asset: &Asset) {
    if let Some(logical_path) = logical_file_path(asset)
      && self.cache.invalidate(&logical_path)
    {
      tracing::debug!(logical = %logical_path, "invalidated cached url");
    }
  }
}

impl<S: Storage> SaveHook<S> for CssUrlHooks {
  fn pre_save(&self, library: &mut Library<S>, asset: &mut Asset) -> FilerResult<()> {
    self.resolve_resource_urls(library, asset)
  }

  fn post_save(&self, library: &mut Library<S>, asset: &Asset) -> FilerResult<()> {
    self.update_referencing_css_files(library, asset)?;
    self.clear_urls_cache(asset);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::css::markers::ALREADY_RESOLVED_MARKER;
  use crate::library::MemoryStorage;
  use crate::models::{AssetId, FolderChain};

  fn library_with(lookup: BackReferenceLookup) -> (Library<MemoryStorage>, Arc<UrlCache>) {
    let mut library = Library::new(MemoryStorage::new("/media/"), "filer_public");
    let config = FilerConfig {
      back_reference_lookup: lookup,
      ..FilerConfig::default()
    };
    let cache = CssUrlHooks::install(&mut library, &config);
    (library, cache)
  }

  fn upload(library: &mut Library<MemoryStorage>, name: &str, folder: Option<&str>, content: &str) -> AssetId {
    let asset = library.upload(name, folder.map(FolderChain::parse), content.as_bytes().to_vec());
    library.save(asset).unwrap()
  }

  fn text(library: &Library<MemoryStorage>, id: AssetId) -> String {
    let asset = library.get(id).unwrap();
    String::from_utf8(library.read_content(asset).unwrap()).unwrap()
  }

  #[test]
  fn round_trip_reference_consistency() {
    for lookup in [BackReferenceLookup::Index, BackReferenceLookup::Scan] {
      let (mut library, _) = library_with(lookup);
      let image = upload(&mut library, "x.png", Some("a/img"), "one");
      let stylesheet = upload(&mut library, "site.css", Some("a/b"), ".nice { background: url('../img/x.png'); }");

      let first_url = library.url(library.get(image).unwrap()).unwrap();
      let before = text(&library, stylesheet);
      assert_eq!(
        before,
        format!("{ALREADY_RESOLVED_MARKER}\n.nice {{ background: url('{first_url}') /* logicalurl('a/img/x.png') */; }}")
      );

      library.replace_content(image, b"two".to_vec()).unwrap();
      let second_url = library.url(library.get(image).unwrap()).unwrap();
      assert_ne!(first_url, second_url);

      assert_eq!(text(&library, stylesheet), before.replace(&first_url, &second_url));
    }
  }

  #[test]
  fn resaving_a_resolved_stylesheet_changes_nothing() {
    let (mut library, _) = library_with(BackReferenceLookup::Index);
    upload(&mut library, "x.png", Some("media"), "png");
    let stylesheet = upload(&mut library, "site.css", Some("media"), "a { background: url(x.png) }");
    let before = library.get(stylesheet).cloned().unwrap();

    library.move_to(stylesheet, None).unwrap();
    library.move_to(stylesheet, Some(FolderChain::parse("media"))).unwrap();

    let after = library.get(stylesheet).unwrap();
    assert_eq!(after.stored_name(), before.stored_name());
    assert_eq!(after.sha, before.sha);
    assert_eq!(text(&library, stylesheet).matches(ALREADY_RESOLVED_MARKER).count(), 1);
  }

  #[test]
  fn clipboard_stylesheet_is_not_rewritten() {
    let (mut library, _) = library_with(BackReferenceLookup::Index);
    let css = "a { background: url('x.png') }";
    let stylesheet = upload(&mut library, "site.css", None, css);
    assert_eq!(text(&library, stylesheet), css);
    assert!(library.references().is_empty());
  }

  #[test]
  fn clipboard_resource_triggers_no_back_reference_update() {
    let (mut library, _) = library_with(BackReferenceLookup::Scan);
    let image = upload(&mut library, "x.png", Some("media"), "one");
    let stylesheet = upload(&mut library, "site.css", Some("media"), "a { background: url(x.png) }");
    let before = text(&library, stylesheet);

    library.move_to(image, None).unwrap();
    library.replace_content(image, b"two".to_vec()).unwrap();

    assert_eq!(text(&library, stylesheet), before);
  }

  #[test]
  fn save_invalidates_cached_url() {
    let (mut library, cache) = library_with(BackReferenceLookup::Index);
    let image = upload(&mut library, "x.png", Some("media"), "one");
    cache.insert("media/x.png", "/stale/x.png");

    library.replace_content(image, b"two".to_vec()).unwrap();

    assert_eq!(cache.get("media/x.png"), None);
  }

  #[test]
  fn stylesheet_uploaded_before_its_image_is_patched_later() {
    let (mut library, _) = library_with(BackReferenceLookup::Index);
    let stylesheet = upload(&mut library, "site.css", Some("media/css"), "a { background: url('../img/x.png') }");
    assert!(text(&library, stylesheet).contains("url('../img/x.png') /* logicalurl('media/img/x.png') */"));

    let image = upload(&mut library, "x.png", Some("media/img"), "png");
    let image_url = library.url(library.get(image).unwrap()).unwrap();

    assert!(text(&library, stylesheet).contains(&format!(
      "url('{image_url}') /* logicalurl('media/img/x.png') */"
    )));
  }

  #[test]
  fn unreadable_stylesheet_is_skipped() {
    let (mut library, _) = library_with(BackReferenceLookup::Scan);
    let image = upload(&mut library, "x.png", Some("media"), "one");
    let broken = upload(&mut library, "broken.css", Some("media"), "a { background: url(x.png) }");
    let healthy = upload(&mut library, "site.css", Some("media"), "b { background: url(x.png) }");

    let broken_name = library.get(broken).unwrap().stored_name().unwrap().to_string();
    library.storage_mut().delete(&broken_name).unwrap();

    library.replace_content(image, b"two".to_vec()).unwrap();
    let image_url = library.url(library.get(image).unwrap()).unwrap();

    assert!(text(&library, healthy).contains(&format!("url('{image_url}')")));
  }

  #[test]
  fn stylesheet_uploaded_already_resolved_is_still_patched() {
    for lookup in [BackReferenceLookup::Index, BackReferenceLookup::Scan] {
      let (mut library, _) = library_with(lookup);
      let image = upload(&mut library, "x.png", Some("media"), "one");
      let stylesheet = upload(
        &mut library,
        "site.css",
        Some("media"),
        &format!("{ALREADY_RESOLVED_MARKER}\na {{ background: url('/old') /* logicalurl('media/x.png') */ }}"),
      );
      assert_eq!(library.references().referencing("media/x.png"), vec![stylesheet]);

      library.replace_content(image, b"two".to_vec()).unwrap();
      let image_url = library.url(library.get(image).unwrap()).unwrap();

      assert_eq!(
        text(&library, stylesheet),
        format!("{ALREADY_RESOLVED_MARKER}\na {{ background: url('{image_url}') /* logicalurl('media/x.png') */ }}")
      );
    }
  }

  #[test]
  fn index_records_stylesheet_references() {
    let (mut library, _) = library_with(BackReferenceLookup::Index);
    let stylesheet = upload(
      &mut library,
      "site.css",
      Some("media/css"),
      "a { background: url(../img/a.png) } b { background: url(http://cdn/x.png) }",
    );

    assert_eq!(
      library.references().targets_of(stylesheet).into_iter().collect::<Vec<_>>(),
      vec!["media/img/a.png"]
    );
  }
}
