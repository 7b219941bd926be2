use super::{License, OsFamily};
use crate::shared::Result;
use std::fmt;
use std::path::PathBuf;

/// Maximum length for package names (security limit)
const MAX_PACKAGE_NAME_LENGTH: usize = 255;

/// Maximum length for package versions (security limit)
const MAX_VERSION_LENGTH: usize = 255;

/// Prefix marking the id of a source pseudo-package
pub const SOURCE_ID_PREFIX: &str = "src:";

/// Identity of a package within one resolution run: `name@version`,
/// or `src:name@version` for source pseudo-packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(String);

impl PackageId {
    pub fn binary(name: &str, version: &str) -> Self {
        Self(format!("{}@{}", name, version))
    }

    pub fn source(name: &str, version: &str) -> Self {
        Self(format!("{}{}@{}", SOURCE_ID_PREFIX, name, version))
    }

    /// Accepts an already-formed source pseudo-package id (`src:name@version`)
    pub fn source_ref(raw: &str) -> Option<Self> {
        raw.strip_prefix(SOURCE_ID_PREFIX)
            .filter(|rest| rest.contains('@'))
            .map(|_| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_source(&self) -> bool {
        self.0.starts_with(SOURCE_ID_PREFIX)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upstream source package a binary package was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePackage {
    pub name: String,
    pub version: String,
}

impl SourcePackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// An OS package as recorded in the package database.
///
/// `depends` holds raw dependency *names* as declared by the package manager
/// (already reduced to installed packages where the backend can tell).
/// Rewriting names into ids happens in a later stage and produces
/// [`ResolvedPackage`] values instead of mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    version: String,
    architecture: String,
    depends: Vec<String>,
    provides: Vec<String>,
    files: Vec<PathBuf>,
    source: Option<SourcePackage>,
    source_rpm: Option<String>,
    is_source: bool,
    licenses: Vec<License>,
    os_family: OsFamily,
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Package name cannot be empty");
    }
    if name.len() > MAX_PACKAGE_NAME_LENGTH {
        anyhow::bail!(
            "Package name is too long ({} bytes). Maximum allowed: {} bytes",
            name.len(),
            MAX_PACKAGE_NAME_LENGTH
        );
    }
    // '@' separates name and version inside an id
    if name.chars().any(|c| c.is_whitespace() || c == '@') {
        anyhow::bail!("Package name '{}' contains whitespace or '@'", name);
    }
    Ok(())
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        anyhow::bail!("Package version cannot be empty");
    }
    if version.len() > MAX_VERSION_LENGTH {
        anyhow::bail!(
            "Package version is too long ({} bytes). Maximum allowed: {} bytes",
            version.len(),
            MAX_VERSION_LENGTH
        );
    }
    if version.chars().any(char::is_whitespace) {
        anyhow::bail!("Package version '{}' contains whitespace", version);
    }
    Ok(())
}

impl Package {
    pub fn new(name: String, version: String, os_family: OsFamily) -> Result<Self> {
        validate_name(&name)?;
        validate_version(&version)?;

        Ok(Self {
            name,
            version,
            architecture: String::new(),
            depends: Vec::new(),
            provides: Vec::new(),
            files: Vec::new(),
            source: None,
            source_rpm: None,
            is_source: false,
            licenses: Vec::new(),
            os_family,
        })
    }

    /// Builds the pseudo-package standing for an upstream source package.
    /// It never carries files, licenses or dependencies.
    pub fn source_pseudo_package(source: &SourcePackage, os_family: OsFamily) -> Result<Self> {
        let mut package = Self::new(source.name.clone(), source.version.clone(), os_family)?;
        package.is_source = true;
        Ok(package)
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    pub fn with_depends(mut self, depends: Vec<String>) -> Self {
        self.depends = depends;
        self
    }

    pub fn with_provides(mut self, provides: Vec<String>) -> Self {
        self.provides = provides;
        self
    }

    pub fn with_source(mut self, source: Option<SourcePackage>) -> Self {
        self.source = source;
        self
    }

    pub fn with_source_rpm(mut self, source_rpm: Option<String>) -> Self {
        self.source_rpm = source_rpm;
        self
    }

    pub fn with_licenses(mut self, licenses: Vec<License>) -> Self {
        self.licenses = licenses;
        self
    }

    pub fn id(&self) -> PackageId {
        if self.is_source {
            PackageId::source(&self.name, &self.version)
        } else {
            PackageId::binary(&self.name, &self.version)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn source(&self) -> Option<&SourcePackage> {
        self.source.as_ref()
    }

    pub fn source_rpm(&self) -> Option<&str> {
        self.source_rpm.as_deref()
    }

    pub fn is_source(&self) -> bool {
        self.is_source
    }

    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    pub fn os_family(&self) -> &OsFamily {
        &self.os_family
    }

    /// The source pseudo-package this binary package should point at,
    /// if its upstream source differs from the package itself.
    pub fn distinct_source(&self) -> Option<&SourcePackage> {
        self.source
            .as_ref()
            .filter(|s| s.name != self.name || s.version != self.version)
    }

    pub fn provides_name(&self, name: &str) -> bool {
        self.provides.iter().any(|p| p == name)
    }

    pub(crate) fn add_file(&mut self, path: PathBuf) {
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    pub(crate) fn add_dependency(&mut self, name: String) {
        if !self.depends.contains(&name) {
            self.depends.push(name);
        }
    }

    pub(crate) fn retain_depends<F: FnMut(&String) -> bool>(&mut self, keep: F) {
        self.depends.retain(keep);
    }

    /// Ordering key used for deterministic output: name, then version
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.name, &self.version)
    }
}

/// A package whose dependency names have been rewritten into canonical ids
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    package: Package,
    dependency_ids: Vec<PackageId>,
}

impl ResolvedPackage {
    pub fn new(package: Package, dependency_ids: Vec<PackageId>) -> Self {
        Self {
            package,
            dependency_ids,
        }
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn id(&self) -> PackageId {
        self.package.id()
    }

    pub fn dependency_ids(&self) -> &[PackageId] {
        &self.dependency_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debian() -> OsFamily {
        OsFamily::debian("debian", "12")
    }

    #[test]
    fn test_package_id_binary_and_source() {
        assert_eq!(PackageId::binary("curl", "7.88.1").as_str(), "curl@7.88.1");
        let src = PackageId::source("curl", "7.88.1");
        assert_eq!(src.as_str(), "src:curl@7.88.1");
        assert!(src.is_source());
        assert!(!PackageId::binary("curl", "7.88.1").is_source());
    }

    #[test]
    fn test_package_id_source_ref() {
        assert_eq!(
            PackageId::source_ref("src:glibc@2.36"),
            Some(PackageId::source("glibc", "2.36"))
        );
        assert_eq!(PackageId::source_ref("glibc"), None);
        assert_eq!(PackageId::source_ref("src:glibc"), None);
    }

    #[test]
    fn test_package_new_valid() {
        let package = Package::new("libc6".to_string(), "2.36-9".to_string(), debian())
            .unwrap()
            .with_architecture("amd64");
        assert_eq!(package.name(), "libc6");
        assert_eq!(package.version(), "2.36-9");
        assert_eq!(package.architecture(), "amd64");
        assert_eq!(package.id().as_str(), "libc6@2.36-9");
    }

    #[test]
    fn test_package_new_empty_name() {
        assert!(Package::new("".to_string(), "1.0".to_string(), debian()).is_err());
    }

    #[test]
    fn test_package_new_empty_version() {
        assert!(Package::new("curl".to_string(), "".to_string(), debian()).is_err());
    }

    #[test]
    fn test_package_name_rejects_at_sign() {
        assert!(Package::new("a@b".to_string(), "1".to_string(), debian()).is_err());
    }

    #[test]
    fn test_epoch_versions_are_accepted() {
        let package = Package::new("dpkg".to_string(), "1:1.21.22".to_string(), debian());
        assert!(package.is_ok());
    }

    #[test]
    fn test_source_pseudo_package() {
        let source = SourcePackage::new("glibc", "2.36");
        let package = Package::source_pseudo_package(&source, debian()).unwrap();
        assert!(package.is_source());
        assert_eq!(package.id().as_str(), "src:glibc@2.36");
        assert!(package.files().is_empty());
        assert!(package.licenses().is_empty());
    }

    #[test]
    fn test_distinct_source() {
        let same = Package::new("curl".to_string(), "7.88.1".to_string(), debian())
            .unwrap()
            .with_source(Some(SourcePackage::new("curl", "7.88.1")));
        assert!(same.distinct_source().is_none());

        let different = Package::new("libc6".to_string(), "2.36-9".to_string(), debian())
            .unwrap()
            .with_source(Some(SourcePackage::new("glibc", "2.36")));
        assert_eq!(different.distinct_source().unwrap().name, "glibc");
    }

    #[test]
    fn test_add_file_and_dependency_are_deduplicated() {
        let mut package = Package::new("gcc-12".to_string(), "12.2.0".to_string(), debian()).unwrap();
        package.add_file(PathBuf::from("/usr/bin/gcc-12"));
        package.add_file(PathBuf::from("/usr/bin/gcc-12"));
        package.add_dependency("cpp-12".to_string());
        package.add_dependency("cpp-12".to_string());
        assert_eq!(package.files().len(), 1);
        assert_eq!(package.depends(), &["cpp-12".to_string()]);
    }

    #[test]
    fn test_provides_name() {
        let package = Package::new("libc6-dev".to_string(), "2.36".to_string(), debian())
            .unwrap()
            .with_provides(vec!["libc-dev".to_string()]);
        assert!(package.provides_name("libc-dev"));
        assert!(!package.provides_name("libc6"));
    }
}
