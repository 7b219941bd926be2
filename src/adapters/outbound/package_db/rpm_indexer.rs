use super::index::PackageIndex;
use super::rpm_header::*;
use crate::ports::outbound::PackageIndexer;
use crate::sbom_generation::domain::{License, OsFamily, Package};
use crate::shared::error::SbomError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_DATABASE_FILE_SIZE};
use crate::shared::Result;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Candidate database locations relative to the root; the first present wins
pub const RPMDB_CANDIDATES: &[&str] = &[
    "usr/lib/sysimage/rpm/rpmdb.sqlite",
    "var/lib/rpm/rpmdb.sqlite",
];

/// Pseudo-packages rpm uses to store imported signing keys
const GPG_PUBKEY: &str = "gpg-pubkey";

/// RpmIndexer indexes an RPM sqlite database in a single pass
pub struct RpmIndexer {
    os_family: OsFamily,
    index: PackageIndex,
    licenses: HashMap<String, String>,
}

impl RpmIndexer {
    /// Returns the first candidate database present under `root`
    pub fn find_database(root: &Path) -> Option<PathBuf> {
        RPMDB_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.is_file())
    }

    /// # Errors
    /// Returns an error if no database is present, it cannot be read, or a
    /// header is structurally invalid
    pub fn create(root: &Path, os_family: OsFamily) -> Result<Self> {
        let Some(db_path) = Self::find_database(root) else {
            return Err(SbomError::PackageDatabaseNotFound {
                root: root.to_path_buf(),
                searched: RPMDB_CANDIDATES.join(", "),
            }
            .into());
        };
        Self::from_database(&db_path, os_family)
    }

    pub fn from_database(db_path: &Path, os_family: OsFamily) -> Result<Self> {
        validate_regular_file(db_path, "rpm database")?;
        let size = fs::metadata(db_path)?.len();
        validate_file_size(size, db_path, MAX_DATABASE_FILE_SIZE)?;

        let corrupt = |details: String| SbomError::PackageDatabaseCorrupt {
            path: db_path.to_path_buf(),
            details,
        };

        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| corrupt(e.to_string()))?;
        let mut statement = connection
            .prepare("SELECT blob FROM Packages ORDER BY hnum")
            .map_err(|e| corrupt(e.to_string()))?;
        let blobs = statement
            .query_map([], |row| row.get::<_, Vec<u8>>(0))
            .map_err(|e| corrupt(e.to_string()))?;

        let mut indexer = Self {
            os_family,
            index: PackageIndex::new(),
            licenses: HashMap::new(),
        };

        for blob in blobs {
            let blob = blob.map_err(|e| corrupt(e.to_string()))?;
            let header = RpmHeader::parse(&blob).map_err(corrupt)?;
            indexer.add_header(&header).map_err(corrupt)?;
        }

        Ok(indexer)
    }

    fn add_header(&mut self, header: &RpmHeader<'_>) -> std::result::Result<(), String> {
        let Some(name) = header.string(TAG_NAME) else {
            return Err("package header without a name".to_string());
        };
        if name == GPG_PUBKEY {
            return Ok(());
        }

        let context = |details: String| format!("package {}: {}", name, details);
        let files = exploded_file_list(header).map_err(context)?;
        let architecture = header.string(TAG_ARCH).unwrap_or_default();

        let version = full_version(header).map_err(context)?;
        let package = Package::new(name.clone(), version, self.os_family.clone())
            .map_err(|e| e.to_string())?
            .with_architecture(architecture.clone())
            .with_depends(dedup(header.string_array(TAG_REQUIRENAME).map_err(context)?))
            .with_provides(dedup(header.string_array(TAG_PROVIDENAME).map_err(context)?))
            .with_source_rpm(header.string(TAG_SOURCERPM));

        // multilib pairs and parallel-installed versions share a name
        let key = self.unique_key(&name, &architecture, package.version());
        self.index.insert_package(key.clone(), package);
        for file in files {
            self.index.insert_file(file, &key);
        }
        if let Some(license) = header.string(TAG_LICENSE).filter(|l| !l.trim().is_empty()) {
            self.licenses.entry(name).or_insert(license);
        }
        Ok(())
    }

    /// `name`, then `name:arch`, then `name:arch:version` for the first
    /// key not yet indexed
    fn unique_key(&self, name: &str, architecture: &str, version: &str) -> String {
        [
            name.to_string(),
            format!("{}:{}", name, architecture),
            format!("{}:{}:{}", name, architecture, version),
        ]
        .into_iter()
        .find(|key| !self.index.contains_package(key))
        .unwrap_or_else(|| format!("{}:{}:{}", name, architecture, version))
    }

    pub fn package_count(&self) -> usize {
        self.index.package_count()
    }
}

/// `[epoch:]version-release`, the epoch shown only when non-zero
fn full_version(header: &RpmHeader<'_>) -> std::result::Result<String, String> {
    let version = header.string(TAG_VERSION).unwrap_or_default();
    let release = header.string(TAG_RELEASE).unwrap_or_default();
    let base = if release.is_empty() {
        version
    } else {
        format!("{}-{}", version, release)
    };

    Ok(match header.u32(TAG_EPOCH)? {
        Some(epoch) if epoch > 0 => format!("{}:{}", epoch, base),
        _ => base,
    })
}

/// Joins base names to their directories.
fn exploded_file_list(header: &RpmHeader<'_>) -> std::result::Result<Vec<PathBuf>, String> {
    let basenames = header.string_array(TAG_BASENAMES)?;
    let dirindexes = header.u32_array(TAG_DIRINDEXES)?;
    let dirnames = header.string_array(TAG_DIRNAMES)?;

    if basenames.len() != dirindexes.len() {
        return Err(format!(
            "{} base names but {} directory indexes; unsupported database generation",
            basenames.len(),
            dirindexes.len()
        ));
    }

    basenames
        .iter()
        .zip(dirindexes)
        .map(|(base, dir_index)| {
            dirnames
                .get(dir_index as usize)
                .map(|dir| PathBuf::from(format!("{}{}", dir, base)))
                .ok_or_else(|| format!("directory index {} out of range", dir_index))
        })
        .collect()
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}

impl PackageIndexer for RpmIndexer {
    fn os_family(&self) -> &OsFamily {
        &self.os_family
    }

    fn package_for_file(&self, path: &Path) -> Option<Package> {
        self.index.package_for_file(path)
    }

    /// Requirements may name files (`/bin/sh`), so ownership is the last resort
    fn package_that_provides(&self, name: &str) -> Option<Package> {
        self.index
            .provider(name)
            .or_else(|| self.index.package_for_file(Path::new(name)))
    }

    fn installed_package(&self, name: &str) -> Option<Package> {
        self.index.installed(name)
    }

    fn licenses_for_package(&self, name: &str) -> Result<Vec<License>> {
        Ok(self
            .licenses
            .get(name)
            .map(|declared| vec![License::declared(declared)])
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::super::rpm_header::builder::HeaderBuilder;
    use super::*;
    use tempfile::TempDir;

    fn fedora() -> OsFamily {
        OsFamily::rpm("fedora", "39")
    }

    fn glibc_devel() -> Vec<u8> {
        HeaderBuilder::new()
            .string(TAG_NAME, "glibc-devel")
            .string(TAG_VERSION, "2.38")
            .string(TAG_RELEASE, "14.fc39")
            .string(TAG_ARCH, "x86_64")
            .string(TAG_LICENSE, "LGPL-2.1-or-later AND GPL-2.0-or-later")
            .string(TAG_SOURCERPM, "glibc-2.38-14.fc39.src.rpm")
            .strings(TAG_PROVIDENAME, &["glibc-devel", "glibc-devel(x86-64)"])
            .strings(TAG_REQUIRENAME, &["glibc", "libc.so.6()(64bit)", "/bin/sh", "rpmlib(PayloadIsZstd)"])
            .strings(TAG_BASENAMES, &["stdio.h", "gnu-versions.h"])
            .ints(TAG_DIRINDEXES, &[0, 1])
            .strings(TAG_DIRNAMES, &["/usr/include/", "/usr/include/gnu/"])
            .build()
    }

    fn glibc() -> Vec<u8> {
        HeaderBuilder::new()
            .string(TAG_NAME, "glibc")
            .string(TAG_VERSION, "2.38")
            .string(TAG_RELEASE, "14.fc39")
            .string(TAG_ARCH, "x86_64")
            .string(TAG_LICENSE, "LGPL-2.1-or-later")
            .strings(TAG_PROVIDENAME, &["glibc", "libc.so.6()(64bit)"])
            .strings(TAG_BASENAMES, &["libc.so.6"])
            .ints(TAG_DIRINDEXES, &[0])
            .strings(TAG_DIRNAMES, &["/usr/lib64/"])
            .build()
    }

    fn bash() -> Vec<u8> {
        HeaderBuilder::new()
            .string(TAG_NAME, "bash")
            .string(TAG_VERSION, "5.2.26")
            .string(TAG_RELEASE, "1.fc39")
            .ints(TAG_EPOCH, &[2])
            .string(TAG_ARCH, "x86_64")
            .strings(TAG_BASENAMES, &["sh", "bash"])
            .ints(TAG_DIRINDEXES, &[0, 0])
            .strings(TAG_DIRNAMES, &["/bin/"])
            .build()
    }

    fn write_db(root: &Path, relative: &str, blobs: &[Vec<u8>]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let connection = Connection::open(&path).unwrap();
        connection
            .execute(
                "CREATE TABLE Packages (hnum INTEGER PRIMARY KEY AUTOINCREMENT, blob BLOB NOT NULL)",
                [],
            )
            .unwrap();
        for blob in blobs {
            connection
                .execute("INSERT INTO Packages (blob) VALUES (?1)", [blob])
                .unwrap();
        }
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        write_db(temp.path(), RPMDB_CANDIDATES[1], &[glibc_devel(), glibc(), bash()]);
        temp
    }

    #[test]
    fn test_missing_database_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = RpmIndexer::create(temp.path(), fedora()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SbomError>(),
            Some(SbomError::PackageDatabaseNotFound { .. })
        ));
    }

    #[test]
    fn test_first_candidate_wins() {
        let temp = TempDir::new().unwrap();
        write_db(temp.path(), RPMDB_CANDIDATES[0], &[glibc()]);
        write_db(temp.path(), RPMDB_CANDIDATES[1], &[glibc(), bash()]);

        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();
        assert_eq!(indexer.package_count(), 1);
    }

    #[test]
    fn test_packages_and_files_are_indexed() {
        let temp = fixture();
        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();

        let owner = indexer.package_for_file(Path::new("/usr/include/gnu/gnu-versions.h")).unwrap();
        assert_eq!(owner.name(), "glibc-devel");
        assert_eq!(owner.version(), "2.38-14.fc39");
        assert_eq!(owner.architecture(), "x86_64");
        assert_eq!(owner.source_rpm(), Some("glibc-2.38-14.fc39.src.rpm"));
        assert_eq!(owner.depends().len(), 4);
    }

    #[test]
    fn test_epoch_is_prefixed() {
        let temp = fixture();
        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();
        assert_eq!(indexer.installed_package("bash").unwrap().version(), "2:5.2.26-1.fc39");
    }

    #[test]
    fn test_provides_and_file_fallback() {
        let temp = fixture();
        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();

        assert_eq!(indexer.package_that_provides("libc.so.6()(64bit)").unwrap().name(), "glibc");
        assert_eq!(indexer.package_that_provides("/bin/sh").unwrap().name(), "bash");
        assert!(indexer.installed_package("/bin/sh").is_none());
        assert!(indexer.package_that_provides("rpmlib(PayloadIsZstd)").is_none());
    }

    #[test]
    fn test_declared_license() {
        let temp = fixture();
        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();

        let licenses = indexer.licenses_for_package("glibc-devel").unwrap();
        assert_eq!(licenses.len(), 1);
        assert!(licenses[0].is_declared());
        assert_eq!(licenses[0].expression(), "LGPL-2.1-or-later AND GPL-2.0-or-later");
        assert!(indexer.licenses_for_package("bash").unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_file_arrays_are_fatal() {
        let broken = HeaderBuilder::new()
            .string(TAG_NAME, "broken")
            .string(TAG_VERSION, "1")
            .strings(TAG_BASENAMES, &["a", "b"])
            .ints(TAG_DIRINDEXES, &[0])
            .strings(TAG_DIRNAMES, &["/usr/"])
            .build();
        let temp = TempDir::new().unwrap();
        write_db(temp.path(), RPMDB_CANDIDATES[0], &[broken]);

        let err = RpmIndexer::create(temp.path(), fedora()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SbomError>(),
            Some(SbomError::PackageDatabaseCorrupt { .. })
        ));
    }

    fn glibc_devel_for(arch: &str, stub: &str) -> Vec<u8> {
        HeaderBuilder::new()
            .string(TAG_NAME, "glibc-devel")
            .string(TAG_VERSION, "2.38")
            .string(TAG_RELEASE, "14.fc39")
            .string(TAG_ARCH, arch)
            .string(TAG_LICENSE, "LGPL-2.1-or-later")
            .strings(TAG_BASENAMES, &["stdio.h", stub])
            .ints(TAG_DIRINDEXES, &[0, 1])
            .strings(TAG_DIRNAMES, &["/usr/include/", "/usr/include/gnu/"])
            .build()
    }

    #[test]
    fn test_same_name_packages_keep_their_files() {
        let temp = TempDir::new().unwrap();
        write_db(
            temp.path(),
            RPMDB_CANDIDATES[0],
            &[glibc_devel_for("x86_64", "stubs-64.h"), glibc_devel_for("i686", "stubs-32.h")],
        );

        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();
        assert_eq!(indexer.package_count(), 2);

        let owner_64 = indexer.package_for_file(Path::new("/usr/include/gnu/stubs-64.h")).unwrap();
        let owner_32 = indexer.package_for_file(Path::new("/usr/include/gnu/stubs-32.h")).unwrap();
        assert_eq!(owner_64.architecture(), "x86_64");
        assert_eq!(owner_32.name(), "glibc-devel");
        assert_eq!(owner_32.architecture(), "i686");

        // a file both packages ship stays with the first one indexed
        let shared = indexer.package_for_file(Path::new("/usr/include/stdio.h")).unwrap();
        assert_eq!(shared.architecture(), "x86_64");
        assert_eq!(indexer.installed_package("glibc-devel").unwrap().architecture(), "x86_64");
        assert_eq!(indexer.licenses_for_package("glibc-devel").unwrap().len(), 1);
    }

    #[test]
    fn test_parallel_installed_versions_are_indexed() {
        let kernel = |version: &str, dir: &str| {
            HeaderBuilder::new()
                .string(TAG_NAME, "kernel-devel")
                .string(TAG_VERSION, version)
                .string(TAG_RELEASE, "200.fc39")
                .string(TAG_ARCH, "x86_64")
                .strings(TAG_BASENAMES, &["Makefile"])
                .ints(TAG_DIRINDEXES, &[0])
                .strings(TAG_DIRNAMES, &[dir])
                .build()
        };
        let temp = TempDir::new().unwrap();
        write_db(
            temp.path(),
            RPMDB_CANDIDATES[0],
            &[
                kernel("6.5.6", "/usr/src/kernels/6.5.6/"),
                kernel("6.5.12", "/usr/src/kernels/6.5.12/"),
            ],
        );

        let indexer = RpmIndexer::create(temp.path(), fedora()).unwrap();
        let newer = indexer
            .package_for_file(Path::new("/usr/src/kernels/6.5.12/Makefile"))
            .unwrap();
        assert_eq!(newer.version(), "6.5.12-200.fc39");
    }

    #[test]
    fn test_corrupt_string_count_is_fatal() {
        let mut blob = HeaderBuilder::new()
            .strings(TAG_REQUIRENAME, &["glibc"])
            .string(TAG_NAME, "broken")
            .string(TAG_VERSION, "1")
            .build();
        // count field of the REQUIRENAME index entry
        blob[20..24].copy_from_slice(&u32::MAX.to_be_bytes());
        let temp = TempDir::new().unwrap();
        write_db(temp.path(), RPMDB_CANDIDATES[0], &[blob]);

        let err = RpmIndexer::create(temp.path(), fedora()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SbomError>(),
            Some(SbomError::PackageDatabaseCorrupt { .. })
        ));
    }
}
