use super::dpkg_indexer::{DpkgIndexer, DPKG_STATUS_PATH};
use super::rpm_indexer::{RpmIndexer, RPMDB_CANDIDATES};
use crate::ports::outbound::{LicenseDetector, PackageIndexer};
use crate::sbom_generation::domain::{OsFamily, PackageManager};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// os-release(5) locations, relative to the root, in lookup order
const OS_RELEASE_CANDIDATES: &[&str] = &["etc/os-release", "usr/lib/os-release"];

/// Probes `root` for a supported package database and builds its index.
///
/// dpkg is preferred when its status file exists; otherwise the RPM
/// database candidates are tried in order.
///
/// # Errors
/// Returns `PackageDatabaseNotFound` if neither backend's database is
/// present, or the backend's error if the database cannot be indexed
pub fn open_package_database(
    root: &Path,
    license_detector: Box<dyn LicenseDetector>,
) -> Result<Box<dyn PackageIndexer>> {
    if !root.is_dir() {
        return Err(SbomError::InvalidRootPath {
            path: root.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    let manager = detect_package_manager(root);
    let os_family = read_os_family(root, manager);

    match manager {
        PackageManager::Debian => Ok(Box::new(DpkgIndexer::create(
            root,
            os_family,
            license_detector,
        )?)),
        PackageManager::Rpm => Ok(Box::new(RpmIndexer::create(root, os_family)?)),
        PackageManager::Unknown => {
            let mut searched = vec![DPKG_STATUS_PATH];
            searched.extend_from_slice(RPMDB_CANDIDATES);
            Err(SbomError::PackageDatabaseNotFound {
                root: root.to_path_buf(),
                searched: searched.join(", "),
            }
            .into())
        }
    }
}

pub fn detect_package_manager(root: &Path) -> PackageManager {
    if root.join(DPKG_STATUS_PATH).is_file() {
        PackageManager::Debian
    } else if RpmIndexer::find_database(root).is_some() {
        PackageManager::Rpm
    } else {
        PackageManager::Unknown
    }
}

/// Reads the distro identity; a missing os-release yields an unknown distro
pub fn read_os_family(root: &Path, manager: PackageManager) -> OsFamily {
    OS_RELEASE_CANDIDATES
        .iter()
        .find_map(|candidate| fs::read_to_string(root.join(candidate)).ok())
        .map(|content| OsFamily::from_os_release(manager, &content))
        .unwrap_or_else(|| OsFamily::new(manager, "unknown", ""))
}
