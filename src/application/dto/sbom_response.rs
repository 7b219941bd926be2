use crate::sbom_generation::domain::{Bom, BuildDependencies, Warning};

/// SbomResponse - Internal response DTO from SBOM generation use case
///
/// Carries the assembled document together with the resolved partitions it
/// was built from, so adapters and tests can inspect either.
#[derive(Debug, Clone)]
pub struct SbomResponse {
    /// The assembled component graph
    pub bom: Bom,
    /// Code, tool and transitive packages with rewritten dependency ids
    pub build_dependencies: BuildDependencies,
    /// Recoverable problems met along the way; empty for a clean run
    pub warnings: Vec<Warning>,
}

impl SbomResponse {
    pub fn new(bom: Bom, build_dependencies: BuildDependencies, warnings: Vec<Warning>) -> Self {
        Self {
            bom,
            build_dependencies,
            warnings,
        }
    }
}

/// MergeResponse - Internal response DTO from the merge use case
#[derive(Debug, Clone)]
pub struct MergeResponse {
    pub bom: Bom,
    pub warnings: Vec<Warning>,
}

impl MergeResponse {
    pub fn new(bom: Bom, warnings: Vec<Warning>) -> Self {
        Self { bom, warnings }
    }
}
