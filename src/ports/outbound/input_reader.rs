use crate::sbom_generation::domain::Observations;
use crate::shared::Result;
use std::path::Path;

/// ObservationReader port for loading a build's file-access observations
pub trait ObservationReader {
    /// Reads and parses the observation log at `path`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist or fails the file security checks
    /// - The content is not a valid observation log
    fn read_observations(&self, path: &Path) -> Result<Observations>;
}

/// DocumentReader port for loading SBOM documents to merge
pub trait DocumentReader {
    /// Reads the raw document text at `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails the file security checks
    fn read_document(&self, path: &Path) -> Result<String>;
}
