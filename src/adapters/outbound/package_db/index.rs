use crate::sbom_generation::domain::Package;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// In-memory package index shared by the database backends.
///
/// Packages are kept in a name-ordered map so that the provides scan
/// always returns the same package for the same database.
#[derive(Debug, Default)]
pub(crate) struct PackageIndex {
    files: HashMap<PathBuf, String>,
    packages: BTreeMap<String, Package>,
}

impl PackageIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `owner` for `path` unless another package already owns it
    pub(crate) fn insert_file(&mut self, path: PathBuf, owner: &str) {
        self.files.entry(path).or_insert_with(|| owner.to_string());
    }

    pub(crate) fn remove_files_where<F: FnMut(&Path) -> bool>(&mut self, mut predicate: F) -> usize {
        let before = self.files.len();
        self.files.retain(|path, _| !predicate(path));
        before - self.files.len()
    }

    /// Inserts a package under `key`. Returns false if the key is taken.
    pub(crate) fn insert_package(&mut self, key: String, package: Package) -> bool {
        if self.packages.contains_key(&key) {
            return false;
        }
        self.packages.insert(key, package);
        true
    }

    pub(crate) fn contains_package(&self, key: &str) -> bool {
        self.packages.contains_key(key)
    }

    pub(crate) fn all_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub(crate) fn packages_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.values_mut()
    }

    pub(crate) fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub(crate) fn file_count(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn package_for_file(&self, path: &Path) -> Option<Package> {
        let owner = self.files.get(path)?;
        self.installed(owner).or_else(|| {
            let (bare, _arch) = owner.split_once(':')?;
            self.installed(bare)
        })
    }

    pub(crate) fn installed(&self, name: &str) -> Option<Package> {
        self.packages.get(name).cloned()
    }

    pub(crate) fn provider(&self, name: &str) -> Option<Package> {
        self.installed(name).or_else(|| {
            self.packages
                .values()
                .find(|p| p.provides_name(name))
                .cloned()
        })
    }
}
