//! Content replacement keeping digest and size metadata consistent.

use sha2::{Digest, Sha256};

use crate::error::FilerResult;
use crate::library::Storage;
use crate::models::{Asset, FileContent};

/// Hex encoded SHA-256 digest of `content`.
pub fn content_digest(content: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(content);
  let digest = hasher.finalize();
  digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Replace the bytes of `asset` and refresh its digest and size.
///
/// Pending uploads are replaced in place. Stored files are saved again through `storage`,
/// which may choose a new physical name; the superseded file is then removed.
pub fn rewrite_content<S>(asset: &mut Asset, storage: &mut S, new_content: &[u8]) -> FilerResult<()>
where
  S: Storage + ?Sized,
{
  let next = match asset.stored_name().map(str::to_string) {
    None => FileContent::Pending(new_content.to_vec()),
    Some(previous) => {
      let stored = storage.save(&previous, new_content)?;
      if stored != previous
        && let Err(err) = storage.delete(&previous)
      {
        tracing::warn!(asset = %asset.id, name = %previous, error = %err, "failed to remove superseded file");
      }
      FileContent::Stored(stored)
    }
  };

  asset.file = next;
  asset.sha = content_digest(new_content);
  asset.size = new_content.len() as u64;
  Ok(())
}
