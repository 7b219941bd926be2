use crate::shared::Result;
use std::path::{Path, PathBuf};

/// LinkResolver port: follows a path's symbolic-link chain
///
/// Executed compilers are usually reached through alias chains
/// (`/usr/bin/cc` -> `/etc/alternatives/cc` -> `/usr/bin/gcc-12`); the
/// package database only knows the final target.
pub trait LinkResolver {
    /// # Errors
    /// Returns an error if any link in the chain cannot be read
    fn resolve_links(&self, path: &Path) -> Result<PathBuf>;
}

/// FileHasher port: content hashes for build tool files
pub trait FileHasher {
    /// Returns the lowercase hex SHA-256 of the file content
    ///
    /// # Errors
    /// Returns an error if the file cannot be read
    fn sha256(&self, path: &Path) -> Result<String>;
}
