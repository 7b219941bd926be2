use crate::sbom_generation::domain::{License, OsFamily, Package};
use crate::shared::Result;
use std::path::Path;

/// PackageIndexer port: read-only view over an indexed package database
///
/// Implementations build their index up front (a fallible `create`
/// constructor that fails hard when the database is absent or invalid) and
/// are then queried by the resolver. One instance serves one resolution run;
/// after construction it is safe to share for concurrent reads.
///
/// Resolver and assembler code never branches on which backend it is
/// talking to; everything backend-specific lives behind this trait.
pub trait PackageIndexer {
    /// Package-manager kind and distro the database belongs to
    fn os_family(&self) -> &OsFamily;

    /// Returns the package owning `path`
    ///
    /// Owner names recorded with an architecture qualifier (`pkg:amd64`)
    /// are retried without it.
    fn package_for_file(&self, path: &Path) -> Option<Package>;

    /// Returns the installed package named `name`, or else the first
    /// indexed package whose provides list contains `name`
    fn package_that_provides(&self, name: &str) -> Option<Package>;

    /// Exact-name lookup among installed packages, without provides fallback
    fn installed_package(&self, name: &str) -> Option<Package>;

    /// License attributions for a package, deduplicated by (id, expression)
    ///
    /// # Errors
    /// Returns an error if license detection fails; callers treat this as
    /// recoverable and continue with no licenses.
    fn licenses_for_package(&self, name: &str) -> Result<Vec<License>>;
}

impl<T: PackageIndexer + ?Sized> PackageIndexer for Box<T> {
    fn os_family(&self) -> &OsFamily {
        (**self).os_family()
    }

    fn package_for_file(&self, path: &Path) -> Option<Package> {
        (**self).package_for_file(path)
    }

    fn package_that_provides(&self, name: &str) -> Option<Package> {
        (**self).package_that_provides(name)
    }

    fn installed_package(&self, name: &str) -> Option<Package> {
        (**self).installed_package(name)
    }

    fn licenses_for_package(&self, name: &str) -> Result<Vec<License>> {
        (**self).licenses_for_package(name)
    }
}
