pub mod bom;
pub mod build_dependencies;
pub mod license;
pub mod observations;
pub mod os_family;
pub mod package;
pub mod sbom_metadata;
pub mod warnings;

pub use bom::{
    Bom, BomMetadata, Component, ComponentType, Hash, MetadataOverrides, Property, Scope, Tool,
};
pub use build_dependencies::{BuildDependencies, Partition, RawBuildDependencies};
pub use license::{dedup_licenses, License};
pub use observations::Observations;
pub use os_family::{OsFamily, PackageManager};
pub use package::{Package, PackageId, ResolvedPackage, SourcePackage};
pub use sbom_metadata::SbomMetadata;
pub use warnings::{Warning, WarningKind, Warnings};
