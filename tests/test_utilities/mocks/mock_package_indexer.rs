use buildbom::prelude::*;
use buildbom::sbom_generation::domain::SourcePackage;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Mock PackageIndexer backed by in-memory maps
pub struct MockPackageIndexer {
    pub os_family: OsFamily,
    pub files: HashMap<PathBuf, String>,
    pub packages: BTreeMap<String, Package>,
    pub licenses: HashMap<String, Vec<License>>,
    pub failing_licenses: HashSet<String>,
}

impl MockPackageIndexer {
    pub fn debian() -> Self {
        Self::with_os_family(OsFamily::debian("debian", "12"))
    }

    pub fn fedora() -> Self {
        Self::with_os_family(OsFamily::rpm("fedora", "39"))
    }

    fn with_os_family(os_family: OsFamily) -> Self {
        Self {
            os_family,
            files: HashMap::new(),
            packages: BTreeMap::new(),
            licenses: HashMap::new(),
            failing_licenses: HashSet::new(),
        }
    }

    pub fn with_package(self, name: &str, version: &str, depends: &[&str], files: &[&str]) -> Self {
        let package = Package::new(name.to_string(), version.to_string(), self.os_family.clone())
            .unwrap()
            .with_architecture("amd64")
            .with_depends(depends.iter().map(|s| s.to_string()).collect());
        self.with(package, files)
    }

    /// Adds a package built from a source package with a different name
    pub fn with_sourced_package(
        self,
        name: &str,
        version: &str,
        source: (&str, &str),
        files: &[&str],
    ) -> Self {
        let package = Package::new(name.to_string(), version.to_string(), self.os_family.clone())
            .unwrap()
            .with_architecture("amd64")
            .with_source(Some(SourcePackage::new(source.0, source.1)));
        self.with(package, files)
    }

    pub fn with(mut self, package: Package, files: &[&str]) -> Self {
        for file in files {
            self.files
                .insert(PathBuf::from(file), package.name().to_string());
        }
        self.packages.insert(package.name().to_string(), package);
        self
    }

    pub fn with_license(mut self, name: &str, license: License) -> Self {
        self.licenses
            .entry(name.to_string())
            .or_default()
            .push(license);
        self
    }

    pub fn with_failing_license(mut self, name: &str) -> Self {
        self.failing_licenses.insert(name.to_string());
        self
    }
}

impl PackageIndexer for MockPackageIndexer {
    fn os_family(&self) -> &OsFamily {
        &self.os_family
    }

    fn package_for_file(&self, path: &Path) -> Option<Package> {
        self.files
            .get(path)
            .and_then(|name| self.packages.get(name))
            .cloned()
    }

    fn package_that_provides(&self, name: &str) -> Option<Package> {
        self.packages.get(name).cloned().or_else(|| {
            self.packages
                .values()
                .find(|p| p.provides_name(name))
                .cloned()
        })
    }

    fn installed_package(&self, name: &str) -> Option<Package> {
        self.packages.get(name).cloned()
    }

    fn licenses_for_package(&self, name: &str) -> Result<Vec<License>> {
        if self.failing_licenses.contains(name) {
            anyhow::bail!("copyright file for {} is not valid UTF-8", name);
        }
        Ok(self.licenses.get(name).cloned().unwrap_or_default())
    }
}
