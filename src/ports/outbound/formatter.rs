use crate::sbom_generation::domain::Bom;
use crate::shared::Result;

/// SbomFormatter port for serializing an assembled document
pub trait SbomFormatter {
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, bom: &Bom) -> Result<String>;
}

/// SbomParser port for reading documents produced elsewhere (other scanners,
/// earlier runs) back into the component graph model
pub trait SbomParser {
    /// # Errors
    /// Returns an error if the content is not a document in this format
    fn parse(&self, content: &str) -> Result<Bom>;
}
