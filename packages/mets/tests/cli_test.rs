//! Command-line tests running the `sip-mets` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sip_mets() -> Command {
    Command::cargo_bin("sip-mets").unwrap()
}

#[test]
fn test_assemble_offline_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("mets.xml");

    sip_mets()
        .arg("assemble")
        .arg(fixture("submission.yaml"))
        .arg("--offline")
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(xml.contains("ark:/99999/offline-1"));
    assert!(xml.contains("file00000003"));
}

#[test]
fn test_assemble_offline_to_stdout() {
    sip_mets()
        .arg("assemble")
        .arg(fixture("submission.yaml"))
        .arg("--offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("<mets:structMap TYPE=\"LOGICAL\">"));
}

#[test]
fn test_assemble_missing_manifest_fails() {
    sip_mets()
        .arg("assemble")
        .arg("does-not-exist.yaml")
        .arg("--offline")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn test_inventory_prints_yaml() {
    sip_mets()
        .arg("inventory")
        .arg(fixture("mets.xml"))
        .arg("--linked")
        .assert()
        .success()
        .stdout(predicate::str::contains("file00000001:"))
        .stdout(predicate::str::contains("checksum: abc123"));
}

#[test]
fn test_amend_format_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("amended.xml");

    sip_mets()
        .arg("amend-format")
        .arg(fixture("mets.xml"))
        .args(["--amd-id", "amd00000002", "--tool-version", "6.7"])
        .args(["--signature-file", "DROID_SignatureFile_V119.xml"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("amd00000002-event02"));

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.contains("amd00000002-object01 amd00000002-event01 amd00000002-agent01 amd00000002-agent02 amd00000002-event02"));
}

#[test]
fn test_amend_characterization_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("mets.xml");
    fs::copy(fixture("mets.xml"), &document).unwrap();

    sip_mets()
        .arg("amend-characterization")
        .arg(&document)
        .args(["--tool-version", "21.03"])
        .assert()
        .success();

    let xml = fs::read_to_string(&document).unwrap();
    assert!(xml.contains("MediaInfo;21.03"));
    assert!(xml.contains("amd00000002-event03"));
}

#[test]
fn test_amend_unknown_amd_sec_fails() {
    sip_mets()
        .arg("amend-characterization")
        .arg(fixture("mets.xml"))
        .args(["--amd-id", "amd00000009", "--tool-version", "21.03"])
        .args(["-o", "unused.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("amd00000009"));
}
