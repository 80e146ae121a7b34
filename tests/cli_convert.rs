//! End-to-end tests for `swext convert` against a stand-in converter.
//!
//! The launcher is pointed at `/bin/sh` through `SWEXT_XCRUN`, so the
//! `safari-web-extension-converter` argument resolves to a script written
//! into the test's working directory.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const CONVERTER_SCRIPT: &str = "safari-web-extension-converter";
const FIXTURE: &str = include_str!("fixtures/project.pbxproj");

fn write_converter(dir: &Path, body: &str) {
    fs::write(dir.join(CONVERTER_SCRIPT), body).expect("write converter script");
}

fn swext(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swext"))
        .args(args)
        .current_dir(dir)
        .env("SWEXT_XCRUN", "/bin/sh")
        .env_remove("RUST_LOG")
        .output()
        .expect("run swext")
}

#[test]
fn missing_extension_param_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let output = swext(dir.path(), &["convert"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no extension param specified"));
}

#[test]
fn conflicting_platforms_are_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let output = swext(
        dir.path(),
        &["convert", "--extension", "./ext", "--ios-only", "--mac-only"],
    );
    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("can't specify both ios_only and mac_only")
    );
}

#[test]
fn missing_launcher_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_swext"))
        .args(["convert", "--extension", "./ext"])
        .current_dir(dir.path())
        .env("SWEXT_XCRUN", "/nonexistent/xcrun")
        .output()
        .expect("run swext");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("command does not exist"));
}

#[test]
fn dry_run_prints_the_converter_command() {
    let dir = TempDir::new().expect("tempdir");
    let output = swext(
        dir.path(),
        &["--dry-run", "convert", "--extension", "./ext", "--app-name", "My App"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        "[DRY RUN] Would run: /bin/sh safari-web-extension-converter ./ext --no-prompt --no-open --app-name 'My App' --swift"
    ));
}

#[test]
fn extension_not_found_stops_before_patching() {
    let dir = TempDir::new().expect("tempdir");
    write_converter(dir.path(), "echo \"Could not find extension at $1\" >&2\nexit 1\n");
    let bundle = dir.path().join("Demo App.xcodeproj");
    fs::create_dir_all(&bundle).expect("create bundle");
    fs::write(bundle.join("project.pbxproj"), FIXTURE).expect("write project");

    let output = swext(
        dir.path(),
        &["convert", "--extension", "/x", "--bundle-identifier", "com.acme.demo"],
    );

    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("extension not found at specified directory")
    );
    assert_eq!(
        fs::read_to_string(bundle.join("project.pbxproj")).expect("read"),
        FIXTURE
    );
    assert!(!bundle.join("xcshareddata").exists());
}

#[test]
fn converts_and_corrects_the_generated_project() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("out");
    let bundle = out.join("Demo App.xcodeproj");
    fs::create_dir_all(&bundle).expect("create bundle");
    fs::write(bundle.join("project.pbxproj"), FIXTURE).expect("write project");
    fs::create_dir_all(out.join("Shared (App)")).expect("create shared dir");
    fs::write(
        out.join("Shared (App)/ViewController.swift"),
        "let extensionBundleIdentifier = \"com.acme.Demo-App.Extension\"\n",
    )
    .expect("write source");

    write_converter(
        dir.path(),
        &format!(
            "cat <<'EOF'\n\
             Xcode Project Location: {}\n\
             App Name: Demo App\n\
             App Bundle Identifier: com.acme.Demo-App\n\
             Platform: All\n\
             Language: Swift\n\
             EOF\n\
             echo 'Warning: The following keys in your manifest.json are not supported' >&2\n\
             echo '  background.persistent' >&2\n",
            out.display()
        ),
    );

    let output = swext(
        dir.path(),
        &[
            "--json",
            "convert",
            "--extension",
            "./ext",
            "--bundle-identifier",
            "com.acme.demo",
            "--run-log-dir",
            "runs",
        ],
    );
    assert!(
        output.status.success(),
        "swext failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["app_name"], "Demo App");
    assert_eq!(report["app_bundle_identifier"], "com.acme.demo");
    assert_eq!(report["app_extension_bundle_identifier"], "com.acme.demo.extension");
    assert_eq!(report["platform"], "All");
    assert_eq!(report["language"], "Swift");
    assert_eq!(
        report["warnings"],
        serde_json::json!([
            "The following keys in your manifest.json are not supported\n  background.persistent"
        ])
    );
    assert_eq!(
        report["patch"]["updated_configurations"]
            .as_array()
            .map(|a| a.len()),
        Some(4)
    );

    let project = fs::read_to_string(bundle.join("project.pbxproj")).expect("read project");
    assert!(project.contains("PRODUCT_BUNDLE_IDENTIFIER = com.acme.demo;"));
    assert!(!project.contains("\"com.acme.Demo-App.Extension\""));
    assert_eq!(
        fs::read_to_string(out.join("Shared (App)/ViewController.swift")).expect("read source"),
        "let extensionBundleIdentifier = \"com.acme.demo.extension\"\n"
    );

    let runs: Vec<_> = fs::read_dir(dir.path().join("runs"))
        .expect("run log dir")
        .collect();
    assert_eq!(runs.len(), 1);
}

#[test]
fn parse_command_prints_field_values() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("stderr.txt"),
        "Warning: first\nmore detail\nWarning: second\n",
    )
    .expect("write capture");

    let output = swext(dir.path(), &["parse", "stderr.txt", "--key", "Warning"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "first\nmore detail\nsecond\n"
    );
}
