use crate::sbom_generation::domain::License;
use crate::shared::Result;
use std::path::Path;

/// LicenseDetector port: classifies license text
///
/// File bytes in, candidate licenses out. The path is informational and
/// recorded on the returned licenses.
pub trait LicenseDetector {
    /// # Errors
    /// Returns an error if the content cannot be classified at all
    fn detect(&self, path: &Path, content: &[u8]) -> Result<Vec<License>>;
}
