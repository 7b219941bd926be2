mod bom_assembler;
mod bom_merger;
mod dependency_id_rewriter;
mod dependency_resolver;
mod observation_filter;
pub mod purl;
mod sbom_generator;

pub use bom_assembler::{root_component, BomAssembler, SOURCE_RPM_PROPERTY};
pub use bom_merger::BomMerger;
pub use dependency_id_rewriter::DependencyIdRewriter;
pub use dependency_resolver::{is_unresolvable_name, DependencyResolver};
pub use observation_filter::{
    ObservationFilter, DEFAULT_HEADER_EXTENSIONS, DEFAULT_INCLUDE_DIRS, DEFAULT_TOOLCHAIN_BINARIES,
};
pub use sbom_generator::{SbomGenerator, TOOL_NAME};
