//! Command line front-end for a file library stored in a directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use filer_css::css::logical_file_path;
use filer_css::library::{Catalog, LibraryResolver};
use filer_css::rewrite::css_preprocessor;
use filer_css::{AssetId, CssUrlHooks, FilerConfig, FolderChain, FsStorage, Library};

/// Upload assets into a file library and keep stylesheet URLs resolved.
#[derive(Debug, Parser)]
#[command(name = "filer-css", version, about)]
struct Cli {
  /// Library root holding the catalog, the stored files and `filer.config.json`.
  #[arg(long, default_value = ".")]
  root: PathBuf,
  /// Log debug output.
  #[arg(short, long)]
  verbose: bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Upload a local file into the library.
  Upload {
    /// File to upload.
    file: PathBuf,
    /// Folder path to file the upload under; omitted uploads land in the clipboard.
    #[arg(long)]
    folder: Option<String>,
    /// Display name overriding the file name.
    #[arg(long)]
    name: Option<String>,
  },
  /// File an asset under a folder, or move it to the clipboard.
  Move {
    /// Asset identifier.
    id: u64,
    /// Destination folder path.
    #[arg(long, conflicts_with = "clipboard", required_unless_present = "clipboard")]
    folder: Option<String>,
    /// Move the asset to the clipboard.
    #[arg(long)]
    clipboard: bool,
  },
  /// Replace the bytes of an asset with a local file.
  Replace {
    /// Asset identifier.
    id: u64,
    /// File holding the new content.
    file: PathBuf,
  },
  /// Save an asset again without changes.
  Save {
    /// Asset identifier.
    id: u64,
  },
  /// Print an asset by logical path with its quoted urls resolved.
  Serve {
    /// Logical path such as `site/css/theme.css`.
    path: String,
  },
  /// Rebuild the stylesheet reference index from the stored markers.
  Reindex,
  /// List every asset of the library.
  List,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);
  run(cli)
}

fn init_tracing(verbose: bool) {
  let default_directive = if verbose { "debug" } else { "info" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .compact()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let config = FilerConfig::discover(&cli.root);
  let catalog_path = config.catalog_path(&cli.root);
  let catalog = Catalog::load(&catalog_path)
    .with_context(|| format!("failed to load catalog at {}", catalog_path.display()))?;

  let storage = FsStorage::new(config.storage_root(&cli.root), config.media_url.clone());
  let mut library = Library::with_catalog(storage, config.upload_prefix.clone(), catalog);
  let cache = CssUrlHooks::install(&mut library, &config);

  match cli.command {
    Command::Upload { file, folder, name } => {
      let content = read_local(&file)?;
      let filename = file
        .file_name()
        .and_then(|value| value.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", file.display()))?;

      let mut asset = library.upload(filename, folder.as_deref().map(FolderChain::parse), content);
      asset.name = name;
      let id = library.save(asset)?;
      println!("{}", describe(&library, id));
    }
    Command::Move {
      id,
      folder,
      clipboard,
    } => {
      let folder = if clipboard {
        None
      } else {
        folder.as_deref().map(FolderChain::parse)
      };
      library.move_to(AssetId(id), folder)?;
    }
    Command::Replace { id, file } => {
      let content = read_local(&file)?;
      library.replace_content(AssetId(id), content)?;
      println!("{}", describe(&library, AssetId(id)));
    }
    Command::Save { id } => {
      let asset = library.asset(AssetId(id))?;
      library.save(asset)?;
    }
    Command::Serve { path } => {
      let resolver = LibraryResolver::new(&library, &cache);
      let body = css_preprocessor(&library, &resolver, &path)?;
      io::stdout()
        .write_all(&body)
        .context("failed to write response body")?;
      return Ok(());
    }
    Command::Reindex => {
      let indexed = library.reindex();
      tracing::info!(
        stylesheets = indexed,
        targets = library.references().len(),
        "rebuilt reference index"
      );
    }
    Command::List => {
      for asset in library.assets() {
        println!("{}", describe(&library, asset.id));
      }
      return Ok(());
    }
  }

  library
    .catalog()
    .write(&catalog_path)
    .with_context(|| format!("failed to write catalog at {}", catalog_path.display()))?;
  Ok(())
}

fn read_local(path: &Path) -> Result<Vec<u8>> {
  fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn describe(library: &Library<FsStorage>, id: AssetId) -> String {
  let Some(asset) = library.get(id) else {
    return format!("{id}\t<missing>");
  };
  let location = logical_file_path(asset)
    .unwrap_or_else(|| format!("<clipboard>/{}", asset.display_name()));
  let url = library.url(asset).unwrap_or_default();
  let digest = asset.sha.get(..12).unwrap_or(&asset.sha);

  format!("{id}\t{location}\t{url}\t{}\t{digest}", asset.size)
}
