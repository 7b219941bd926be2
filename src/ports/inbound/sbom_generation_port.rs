use crate::application::dto::{MergeRequest, MergeResponse, SbomRequest, SbomResponse};
use crate::shared::Result;

/// SbomGenerationPort - Inbound port for building one target's SBOM
///
/// Runs the fixed per-target sequence: filter observations, attribute them
/// to packages, close over dependencies, assemble the document.
pub trait SbomGenerationPort {
    /// # Errors
    /// Returns an error if:
    /// - An observed file cannot be attributed to any installed package
    /// - The assembled document cannot be built
    fn generate(&self, request: SbomRequest) -> Result<SbomResponse>;
}

/// SbomMergePort - Inbound port for folding independently built documents into one
pub trait SbomMergePort {
    /// # Errors
    /// Returns an error if no documents are supplied
    fn merge(&self, request: MergeRequest) -> Result<MergeResponse>;
}
