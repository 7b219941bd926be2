use crate::sbom_generation::domain::MetadataOverrides;
use crate::sbom_generation::services::ObservationFilter;
use std::path::PathBuf;

/// SbomRequest - Internal request DTO for SBOM generation use case
///
/// One request describes one build target. The package database is not part
/// of the request; the use case is constructed around an already indexed one.
#[derive(Debug, Clone)]
pub struct SbomRequest {
    /// Path to the observation log recorded during the build
    pub observations_path: PathBuf,
    /// Name of the build target; becomes the document's root component
    pub target_name: String,
    /// Version of the build target (may be empty)
    pub target_version: String,
    /// Which observations count as dependencies
    pub filter: ObservationFilter,
}

impl SbomRequest {
    pub fn new(
        observations_path: PathBuf,
        target_name: String,
        target_version: String,
        filter: ObservationFilter,
    ) -> Self {
        Self {
            observations_path,
            target_name,
            target_version,
            filter,
        }
    }
}

/// MergeRequest - Internal request DTO for the merge use case
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Documents to fold, in order; the first one is the accumulator
    pub document_paths: Vec<PathBuf>,
    /// Root identity overrides applied after folding
    pub overrides: MetadataOverrides,
}

impl MergeRequest {
    pub fn new(document_paths: Vec<PathBuf>, overrides: MetadataOverrides) -> Self {
        Self {
            document_paths,
            overrides,
        }
    }
}
