use super::deb_control::{is_installed, parse_dependency_names, parse_source, parse_stanzas, Stanza};
use super::index::PackageIndex;
use crate::ports::outbound::{LicenseDetector, PackageIndexer};
use crate::sbom_generation::domain::{dedup_licenses, License, OsFamily, Package};
use crate::shared::error::SbomError;
use crate::shared::security::{read_checked, MAX_DATABASE_FILE_SIZE, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// dpkg status database, relative to the filesystem root
pub const DPKG_STATUS_PATH: &str = "var/lib/dpkg/status";

/// Directory holding the per-package `<name>.list` file lists
pub const DPKG_INFO_DIR: &str = "var/lib/dpkg/info";

const DOC_DIR: &str = "usr/share/doc";

/// DpkgIndexer indexes a Debian-style package database
///
/// Built in two phases: the per-package file lists first, then the status
/// database. Directories listed as owned files are pruned, and dependency
/// names that are not themselves installed packages are dropped.
pub struct DpkgIndexer {
    root: PathBuf,
    os_family: OsFamily,
    index: PackageIndex,
    license_detector: Box<dyn LicenseDetector>,
}

impl DpkgIndexer {
    /// Builds the index from the dpkg database under `root`
    ///
    /// # Errors
    /// Returns an error if the status file is missing or unreadable
    pub fn create(
        root: &Path,
        os_family: OsFamily,
        license_detector: Box<dyn LicenseDetector>,
    ) -> Result<Self> {
        let status_path = root.join(DPKG_STATUS_PATH);
        if !status_path.is_file() {
            return Err(SbomError::PackageDatabaseNotFound {
                root: root.to_path_buf(),
                searched: status_path.display().to_string(),
            }
            .into());
        }

        let mut index = PackageIndex::new();
        index_file_lists(root, &mut index)?;

        let status = read_checked(&status_path, "dpkg status database", MAX_DATABASE_FILE_SIZE)
            .map_err(|e| SbomError::PackageDatabaseCorrupt {
                path: status_path.clone(),
                details: e.to_string(),
            })?;
        index_status(&String::from_utf8_lossy(&status), &os_family, &mut index);
        prune_uninstalled_dependencies(&mut index);

        Ok(Self {
            root: root.to_path_buf(),
            os_family,
            index,
            license_detector,
        })
    }

    pub fn package_count(&self) -> usize {
        self.index.package_count()
    }

    pub fn file_count(&self) -> usize {
        self.index.file_count()
    }
}

/// Phase 1: map every file named in `info/*.list` to its owning package
fn index_file_lists(root: &Path, index: &mut PackageIndex) -> Result<()> {
    let info_dir = root.join(DPKG_INFO_DIR);
    let entries = match fs::read_dir(&info_dir) {
        Ok(entries) => entries,
        // A status file without file lists (e.g. a minimal image) still indexes packages
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(SbomError::PackageDatabaseCorrupt {
                path: info_dir,
                details: e.to_string(),
            }
            .into())
        }
    };

    let mut lists: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "list"))
        .collect();
    lists.sort();

    for list in lists {
        let Some(owner) = list.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = read_checked(&list, "dpkg file list", MAX_INPUT_FILE_SIZE).map_err(|e| {
            SbomError::PackageDatabaseCorrupt {
                path: list.clone(),
                details: e.to_string(),
            }
        })?;

        // The first entry is the package's root directory ("/.")
        for line in String::from_utf8_lossy(&content).lines().skip(1) {
            let line = line.trim_end();
            if !line.is_empty() {
                index.insert_file(PathBuf::from(line), owner);
            }
        }
    }

    // Packages declare the directories they own alongside their files
    index.remove_files_where(|path| rooted(root, path).is_dir());
    Ok(())
}

/// Phase 2: parse installed stanzas of the status database into packages
fn index_status(content: &str, os_family: &OsFamily, index: &mut PackageIndex) {
    for stanza in parse_stanzas(content) {
        if !is_installed(&stanza) {
            continue;
        }
        let Some(package) = package_from_stanza(&stanza, os_family) else {
            continue;
        };

        // Multi-arch installs of the same name stay reachable as `name:arch`
        let key = package.name().to_string();
        if index.contains_package(&key) {
            let qualified = format!("{}:{}", package.name(), package.architecture());
            index.insert_package(qualified, package);
        } else {
            index.insert_package(key, package);
        }
    }
}

fn package_from_stanza(stanza: &Stanza, os_family: &OsFamily) -> Option<Package> {
    let name = stanza.get("Package")?;
    let version = stanza.get("Version")?;

    let mut depends: Vec<String> = Vec::new();
    for field in ["Pre-Depends", "Depends"] {
        for name in stanza.get(field).map(|v| parse_dependency_names(v)).unwrap_or_default() {
            if !depends.contains(&name) {
                depends.push(name);
            }
        }
    }

    let package = Package::new(name.clone(), version.clone(), os_family.clone())
        .ok()?
        .with_architecture(stanza.get("Architecture").cloned().unwrap_or_default())
        .with_depends(depends)
        .with_provides(
            stanza
                .get("Provides")
                .map(|p| parse_dependency_names(p))
                .unwrap_or_default(),
        )
        .with_source(stanza.get("Source").and_then(|s| parse_source(s, version)));
    Some(package)
}

/// Alternatives are not reconciled, and a name only provided by another
/// package does not count as installed
fn prune_uninstalled_dependencies(index: &mut PackageIndex) {
    let satisfied: Vec<Vec<String>> = index
        .all_packages()
        .map(|package| {
            package
                .depends()
                .iter()
                .filter(|name| index.contains_package(name))
                .cloned()
                .collect()
        })
        .collect();

    for (package, keep) in index.packages_mut().zip(satisfied) {
        package.retain_depends(|name| keep.contains(name));
    }
}

fn rooted(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

impl PackageIndexer for DpkgIndexer {
    fn os_family(&self) -> &OsFamily {
        &self.os_family
    }

    fn package_for_file(&self, path: &Path) -> Option<Package> {
        self.index.package_for_file(path)
    }

    fn package_that_provides(&self, name: &str) -> Option<Package> {
        self.index.provider(name)
    }

    fn installed_package(&self, name: &str) -> Option<Package> {
        self.index.installed(name)
    }

    fn licenses_for_package(&self, name: &str) -> Result<Vec<License>> {
        let bare = name.split(':').next().unwrap_or(name);
        let copyright = self.root.join(DOC_DIR).join(bare).join("copyright");
        if !copyright.exists() {
            return Ok(Vec::new());
        }

        let content = read_checked(&copyright, "copyright file", MAX_INPUT_FILE_SIZE)?;
        let display_path = Path::new("/").join(DOC_DIR).join(bare).join("copyright");
        let licenses = self.license_detector.detect(&display_path, &content)?;
        Ok(dedup_licenses(licenses))
    }
}
