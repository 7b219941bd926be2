/// End-to-end tests for the CLI
///
/// Each test builds a throwaway root filesystem with a dpkg database,
/// runs the binary against it and inspects the CycloneDX output.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STATUS: &str = "\
Package: zlib1g-dev
Status: install ok installed
Architecture: amd64
Source: zlib
Version: 1:1.2.13.dfsg-1
Depends: zlib1g (= 1:1.2.13.dfsg-1), libc6-dev | libc-dev

Package: zlib1g
Status: install ok installed
Architecture: amd64
Source: zlib
Version: 1:1.2.13.dfsg-1
Depends: libc6 (>= 2.14)

Package: libc6
Status: install ok installed
Architecture: amd64
Version: 2.36-9+deb12u4

Package: gcc-12
Status: install ok installed
Architecture: amd64
Version: 12.2.0-14
Depends: cpp-12 (= 12.2.0-14), libc6 (>= 2.34)

Package: cpp-12
Status: install ok installed
Architecture: amd64
Version: 12.2.0-14
Depends: libc6 (>= 2.34)
";

const ZLIB_DEV_PURL: &str = "pkg:deb/debian/zlib1g-dev@1:1.2.13.dfsg-1?arch=amd64&distro=debian-12";
const GCC_PURL: &str = "pkg:deb/debian/gcc-12@12.2.0-14?arch=amd64&distro=debian-12";

// ============================================================================
// Helper Functions
// ============================================================================

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A Debian 12 root with zlib headers and a gcc-12 toolchain installed
fn create_debian_root(root: &Path) {
    write(root, "etc/os-release", "ID=debian\nVERSION_ID=\"12\"\n");
    write(root, "var/lib/dpkg/status", STATUS);
    write(
        root,
        "var/lib/dpkg/info/zlib1g-dev:amd64.list",
        "/.\n/usr\n/usr/include\n/usr/include/zlib.h\n/usr/include/zconf.h\n",
    );
    write(root, "var/lib/dpkg/info/gcc-12.list", "/.\n/usr\n/usr/bin\n/usr/bin/gcc-12\n");
    write(root, "usr/include/zlib.h", "#include \"zconf.h\"\n");
    write(root, "usr/include/zconf.h", "/* zconf */\n");
    write(root, "usr/bin/gcc-12", "\x7fELF");
    write(
        root,
        "usr/share/doc/zlib1g-dev/copyright",
        "Format: https://www.debian.org/doc/packaging-manuals/copyright-format/1.0/\n\nFiles: *\nLicense: Zlib\n",
    );
    #[cfg(unix)]
    std::os::unix::fs::symlink("gcc-12", root.join("usr/bin/cc")).unwrap();
}

fn write_observations(dir: &Path, name: &str, opened: &[&str], executed: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let log = serde_json::json!({ "opened": opened, "executed": executed });
    fs::write(&path, log.to_string()).unwrap();
    path
}

struct Workspace {
    dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("rootfs");
        create_debian_root(&root);
        Self { dir, root }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Runs `generate` and returns the parsed document
    fn generate(&self, name: &str, opened: &[&str], executed: &[&str]) -> Value {
        let observations = write_observations(self.path(), &format!("{}.json", name), opened, executed);
        let output = cargo_bin_cmd!("buildbom")
            .current_dir(self.path())
            .args(["generate", "--name", name, "--version", "1.0"])
            .arg("--observations")
            .arg(&observations)
            .arg("--root")
            .arg(&self.root)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "generate failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn component<'a>(bom: &'a Value, bom_ref: &str) -> Option<&'a Value> {
    bom["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["bom-ref"] == bom_ref)
}

fn depends_on(bom: &Value, bom_ref: &str) -> Vec<String> {
    bom["dependencies"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["ref"] == bom_ref)
        .and_then(|d| d["dependsOn"].as_array())
        .map(|targets| {
            targets
                .iter()
                .map(|t| t.as_str().unwrap().to_string())
                .collect()
        })
        .unwrap_or_default()
}

// Exit code tests for CLI
mod exit_code_tests {
    use super::*;

    /// Exit code 0: --help should return success
    #[test]
    fn test_exit_code_help() {
        cargo_bin_cmd!("buildbom").arg("--help").assert().code(0);
    }

    /// Exit code 0: --version should return success
    #[test]
    fn test_exit_code_version() {
        cargo_bin_cmd!("buildbom")
            .arg("--version")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("buildbom"));
    }

    /// Exit code 2: Missing subcommand
    #[test]
    fn test_exit_code_missing_subcommand() {
        cargo_bin_cmd!("buildbom").assert().code(2);
    }

    /// Exit code 2: Invalid arguments
    #[test]
    fn test_exit_code_invalid_argument() {
        cargo_bin_cmd!("buildbom")
            .args(["generate", "--invalid-option"])
            .assert()
            .code(2);
    }

    /// Exit code 3: Application error - no package database under the root
    #[test]
    fn test_exit_code_no_package_database() {
        let dir = TempDir::new().unwrap();
        let observations = write_observations(dir.path(), "obs.json", &[], &[]);

        cargo_bin_cmd!("buildbom")
            .current_dir(dir.path())
            .args(["generate", "--name", "app"])
            .arg("--observations")
            .arg(&observations)
            .arg("--root")
            .arg(dir.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains("No supported package database"));
    }

    /// Exit code 3: Application error - an observed header has no owner
    #[test]
    fn test_exit_code_unattributed_header() {
        let workspace = Workspace::new();
        let observations = write_observations(
            workspace.path(),
            "obs.json",
            &["/usr/include/zlib.h", "/usr/include/local_only.h"],
            &[],
        );

        cargo_bin_cmd!("buildbom")
            .current_dir(workspace.path())
            .args(["generate", "--name", "app"])
            .arg("--observations")
            .arg(&observations)
            .arg("--root")
            .arg(&workspace.root)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("No installed package owns"))
            .stderr(predicate::str::contains("/usr/include/local_only.h"));
    }

    /// Exit code 3: Application error - malformed observation log
    #[test]
    fn test_exit_code_malformed_observations() {
        let workspace = Workspace::new();
        fs::write(workspace.path().join("obs.json"), "{ not json").unwrap();

        cargo_bin_cmd!("buildbom")
            .current_dir(workspace.path())
            .args(["generate", "--name", "app", "--observations", "obs.json"])
            .arg("--root")
            .arg(&workspace.root)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse observation log"));
    }
}

#[test]
fn test_e2e_generate_debian_document() {
    let workspace = Workspace::new();

    let bom = workspace.generate(
        "app",
        &["/usr/include/zlib.h", "/usr/include/zconf.h", "/work/app/main.c"],
        &["/usr/bin/gcc-12", "/bin/sh"],
    );

    assert_eq!(bom["bomFormat"], "CycloneDX");
    assert_eq!(bom["specVersion"], "1.6");
    assert_eq!(bom["metadata"]["component"]["name"], "app");
    assert_eq!(bom["metadata"]["lifecycles"][0]["phase"], "build");
    assert_eq!(bom["metadata"]["tools"]["components"][0]["name"], "buildbom");

    // code dependency, with its source package and a DEP-5 license
    let zlib_dev = component(&bom, ZLIB_DEV_PURL).unwrap();
    assert_eq!(zlib_dev["type"], "library");
    assert_eq!(zlib_dev["licenses"][0]["license"]["name"], "Zlib");
    assert!(component(&bom, "pkg:generic/zlib@1.2.13").is_some());
    assert_eq!(
        depends_on(&bom, ZLIB_DEV_PURL),
        vec![
            "pkg:deb/debian/zlib1g@1:1.2.13.dfsg-1?arch=amd64&distro=debian-12".to_string(),
            "pkg:generic/zlib@1.2.13".to_string(),
        ]
    );
    assert_eq!(depends_on(&bom, "pkg:generic/app@1.0"), vec![ZLIB_DEV_PURL.to_string()]);

    // build tool with its hashed executable
    let gcc = component(&bom, GCC_PURL).unwrap();
    assert_eq!(gcc["type"], "application");
    assert_eq!(gcc["scope"], "excluded");
    let file = &gcc["components"][0];
    assert_eq!(file["type"], "file");
    assert_eq!(file["name"], "/usr/bin/gcc-12");
    assert_eq!(file["hashes"][0]["alg"], "SHA-256");
    assert_eq!(file["hashes"][0]["content"].as_str().unwrap().len(), 64);

    // transitive closure
    assert!(component(&bom, "pkg:deb/debian/libc6@2.36-9%2Bdeb12u4?arch=amd64&distro=debian-12").is_some());
    assert!(component(&bom, "pkg:deb/debian/cpp-12@12.2.0-14?arch=amd64&distro=debian-12").is_some());
    assert_eq!(bom["components"].as_array().unwrap().len(), 6);
}

#[cfg(unix)]
#[test]
fn test_e2e_compiler_symlink_is_followed() {
    let workspace = Workspace::new();

    let bom = workspace.generate("app", &[], &["/usr/bin/cc"]);

    let gcc = component(&bom, GCC_PURL).unwrap();
    assert_eq!(gcc["components"][0]["name"], "/usr/bin/gcc-12");
}

#[test]
fn test_e2e_generate_writes_output_file() {
    let workspace = Workspace::new();
    let observations = write_observations(workspace.path(), "obs.json", &["/usr/include/zlib.h"], &[]);
    let output_path = workspace.path().join("app.cdx.json");

    cargo_bin_cmd!("buildbom")
        .current_dir(workspace.path())
        .args(["generate", "--name", "app", "-o", "app.cdx.json"])
        .arg("--observations")
        .arg(&observations)
        .arg("--root")
        .arg(&workspace.root)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    let bom: Value = serde_json::from_str(&fs::read_to_string(output_path).unwrap()).unwrap();
    assert!(component(&bom, ZLIB_DEV_PURL).is_some());
}

#[test]
fn test_e2e_merge_with_overrides() {
    let workspace = Workspace::new();
    let library = workspace.generate("libapp", &["/usr/include/zlib.h"], &["/usr/bin/gcc-12"]);
    let tool = workspace.generate("app-cli", &[], &["/usr/bin/gcc-12"]);
    fs::write(workspace.path().join("lib.cdx.json"), library.to_string()).unwrap();
    fs::write(workspace.path().join("cli.cdx.json"), tool.to_string()).unwrap();

    let output = cargo_bin_cmd!("buildbom")
        .current_dir(workspace.path())
        .args([
            "merge",
            "lib.cdx.json",
            "cli.cdx.json",
            "--name",
            "app-suite",
            "--version",
            "2.0",
            "--supplier",
            "Example Corp",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let merged: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(merged["metadata"]["component"]["name"], "app-suite");
    assert_eq!(merged["metadata"]["component"]["bom-ref"], "pkg:generic/app-suite@2.0");
    assert_eq!(merged["metadata"]["supplier"]["name"], "Example Corp");
    let gcc_count = merged["components"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["bom-ref"] == GCC_PURL)
        .count();
    assert_eq!(gcc_count, 1);
    assert_eq!(
        depends_on(&merged, "pkg:generic/app-suite@2.0"),
        vec![ZLIB_DEV_PURL.to_string()]
    );
}

#[test]
fn test_e2e_merge_rejects_non_cyclonedx_document() {
    let workspace = Workspace::new();
    fs::write(workspace.path().join("spdx.json"), r#"{"spdxVersion": "SPDX-2.3"}"#).unwrap();

    cargo_bin_cmd!("buildbom")
        .current_dir(workspace.path())
        .args(["merge", "spdx.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to parse SBOM document"))
        .stderr(predicate::str::contains("spdx.json"));
}

#[test]
fn test_e2e_config_file_overrides_filter_and_root() {
    let workspace = Workspace::new();
    fs::write(
        workspace.path().join("buildbom.config.yml"),
        format!(
            "root: {}\ntoolchain_binaries: [clang]\n",
            workspace.root.display()
        ),
    )
    .unwrap();
    let observations =
        write_observations(workspace.path(), "obs.json", &["/usr/include/zlib.h"], &["/usr/bin/gcc-12"]);

    // the config is auto-discovered; gcc-12 is no longer a toolchain binary
    let output = cargo_bin_cmd!("buildbom")
        .current_dir(workspace.path())
        .args(["generate", "--name", "app"])
        .arg("--observations")
        .arg(&observations)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let bom: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert!(component(&bom, ZLIB_DEV_PURL).is_some());
    assert!(component(&bom, GCC_PURL).is_none());
}

#[test]
fn test_e2e_invalid_config_is_an_application_error() {
    let workspace = Workspace::new();
    let config_path = workspace.path().join("custom.yml");
    fs::write(&config_path, "metadata:\n  name: \"\"\n").unwrap();

    cargo_bin_cmd!("buildbom")
        .current_dir(workspace.path())
        .args(["merge", "missing.json", "--config"])
        .arg(&config_path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("metadata.name must not be empty"));
}
