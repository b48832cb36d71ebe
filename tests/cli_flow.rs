use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use filer_css::library::Catalog;
use filer_css::{AssetId, FilerConfig};
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
  root: TempDir,
}

impl Workspace {
  fn new() -> Self {
    Self {
      root: TempDir::new().expect("failed to create temp directory"),
    }
  }

  fn root(&self) -> &Path {
    self.root.path()
  }

  fn cli(&self) -> Command {
    let mut cmd = Command::cargo_bin("filer-css").expect("failed to locate filer-css binary");
    cmd.arg("--root").arg(self.root());
    cmd
  }

  fn local_file(&self, name: &str, content: &str) -> PathBuf {
    let dir = self.root().join("incoming");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
  }

  fn catalog(&self) -> Catalog {
    Catalog::load(&FilerConfig::default().catalog_path(self.root())).unwrap()
  }

  fn stored_text(&self, id: AssetId) -> String {
    let catalog = self.catalog();
    let name = catalog.assets[&id].stored_name().unwrap().to_string();
    fs::read_to_string(FilerConfig::default().storage_root(self.root()).join(name)).unwrap()
  }
}

#[test]
fn replacing_an_image_updates_the_stylesheet_and_persists_the_catalog() {
  let ws = Workspace::new();
  let image = ws.local_file("x.png", "one");
  let stylesheet = ws.local_file("site.css", "a { background: url('../img/x.png') }");

  ws.cli()
    .args(["upload"])
    .arg(&image)
    .args(["--folder", "media/img"])
    .assert()
    .success()
    .stdout(predicate::str::contains("media/img/x.png"));
  ws.cli()
    .args(["upload"])
    .arg(&stylesheet)
    .args(["--folder", "media/css"])
    .assert()
    .success();

  assert!(ws.stored_text(AssetId(1)).contains(
    "url('/media/filer_public/x.png') /* logicalurl('media/img/x.png') */"
  ));

  let replacement = ws.local_file("x-new.png", "two");
  ws.cli()
    .args(["replace", "0"])
    .arg(&replacement)
    .assert()
    .success()
    .stdout(predicate::str::contains("/media/filer_public/x_1.png"));

  let catalog = ws.catalog();
  assert_eq!(catalog.assets.len(), 2);
  assert_eq!(catalog.next_id, 2);
  assert_eq!(
    catalog.assets[&AssetId(0)].stored_name(),
    Some("filer_public/x_1.png")
  );
  assert_eq!(catalog.references.referencing("media/img/x.png"), vec![AssetId(1)]);
  assert!(ws.stored_text(AssetId(1)).contains(
    "url('/media/filer_public/x_1.png') /* logicalurl('media/img/x.png') */"
  ));
}

#[test]
fn serving_a_missing_stylesheet_fails() {
  let ws = Workspace::new();

  ws.cli()
    .args(["serve", "media/css/missing.css"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No such file"));
}

#[test]
fn list_prints_clipboard_assets() {
  let ws = Workspace::new();
  let note = ws.local_file("notes.txt", "hello");

  ws.cli().arg("upload").arg(&note).assert().success();

  ws.cli()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("<clipboard>/notes.txt"));
}
