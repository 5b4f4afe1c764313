use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use vbasync_core::container::{CodeProject, Component, DocumentHost};
use vbasync_core::ArtifactKind;

fn vba_sync(cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vba-sync"));
    cmd.current_dir(cwd).env("RUST_LOG", "warn");
    cmd
}

fn document(dir: &Path) -> PathBuf {
    let path = dir.join("Book1.xlsm");
    DocumentHost::create(
        &path,
        Some(CodeProject {
            name: "VBAProject".into(),
            components: vec![
                Component::new("Module1", ArtifactKind::StandardModule, "Sub Main()\nEnd Sub"),
                Component::new("Invoice", ArtifactKind::ClassModule, "Public Total As Double"),
                Component::new("DieseArbeitsmappe", ArtifactKind::DocumentModule, ""),
            ],
        }),
    )
    .expect("create document");
    path
}

#[test]
fn pull_writes_the_default_tree_and_diff_is_clean() {
    let tmp = TempDir::new().expect("tmp");
    document(tmp.path());

    vba_sync(tmp.path())
        .args(["pull", "Book1.xlsm"])
        .assert()
        .success()
        .stdout(contains("3 exported"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("vba_src/Modules/Module1.bas")).expect("read"),
        "Sub Main()\r\nEnd Sub"
    );
    assert!(tmp.path().join("vba_src/ClassModules/Invoice.cls").is_file());
    assert!(tmp.path().join("vba_src/Sheets/DieseArbeitsmappe.cls").is_file());

    vba_sync(tmp.path())
        .args(["diff", "Book1.xlsm"])
        .assert()
        .success()
        .stdout(contains("No differences."));
}

#[test]
fn push_applies_and_saves() {
    let tmp = TempDir::new().expect("tmp");
    let doc = document(tmp.path());
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("Modules")).expect("mkdir");
    fs::write(src.join("Modules/Module1.bas"), "Sub Main()\r\n    Run\r\nEnd Sub").expect("write");
    fs::write(src.join("Modules/Tools.bas"), "Sub Tool()\r\nEnd Sub").expect("write");

    vba_sync(tmp.path())
        .args(["push", "Book1.xlsm", "--source-dir", "src"])
        .assert()
        .success()
        .stdout(contains("updated 'Module1'"))
        .stdout(contains("imported 'Tools'"))
        .stdout(contains("removed 'Invoice'"))
        .stdout(contains("skipped DieseArbeitsmappe"))
        .stdout(contains("Document saved."));

    let host = DocumentHost::open(&doc).expect("open");
    assert_eq!(host.body("Module1"), Some("Sub Main()\n    Run\nEnd Sub"));
    assert_eq!(host.body("Tools"), Some("Sub Tool()\nEnd Sub"));
    assert_eq!(host.body("Invoice"), None);
    assert_eq!(host.body("DieseArbeitsmappe"), Some(""));
}

#[test]
fn push_dry_run_leaves_document_alone() {
    let tmp = TempDir::new().expect("tmp");
    let doc = document(tmp.path());
    let before = fs::read_to_string(&doc).expect("read");
    fs::create_dir_all(tmp.path().join("vba_src/Modules")).expect("mkdir");
    fs::write(tmp.path().join("vba_src/Modules/Module1.bas"), "changed").expect("write");

    vba_sync(tmp.path())
        .args(["push", "Book1.xlsm", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("would update 'Module1'"))
        .stdout(contains("would remove 'Invoice'"));
    assert_eq!(fs::read_to_string(&doc).expect("read"), before);
}

#[test]
fn diff_shows_changed_lines() {
    let tmp = TempDir::new().expect("tmp");
    document(tmp.path());
    vba_sync(tmp.path()).args(["pull", "Book1.xlsm"]).assert().success();
    fs::write(
        tmp.path().join("vba_src/Modules/Module1.bas"),
        "Sub Main()\r\n    MsgBox \"hi\"\r\nEnd Sub",
    )
    .expect("write");

    vba_sync(tmp.path())
        .args(["diff", "Book1.xlsm"])
        .assert()
        .success()
        .stdout(contains("+++ b/Modules/Module1.bas"))
        .stdout(contains("+    MsgBox \"hi\""));
}

#[test]
fn missing_document_fails() {
    let tmp = TempDir::new().expect("tmp");
    vba_sync(tmp.path())
        .args(["push", "Missing.xlsm"])
        .assert()
        .failure()
        .stderr(contains("not accessible"));
}

#[test]
fn document_without_project_pulls_nothing() {
    let tmp = TempDir::new().expect("tmp");
    DocumentHost::create(&tmp.path().join("Plain.xlsx"), None).expect("create");

    vba_sync(tmp.path())
        .args(["pull", "Plain.xlsx"])
        .assert()
        .success()
        .stdout(contains("has no VBA project"));
    assert!(!tmp.path().join("vba_src").exists());
}
