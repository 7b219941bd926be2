//! buildbom - build-time SBOM generation from traced file access
//!
//! This library attributes the headers a build opened and the toolchain
//! binaries it executed to the OS packages that own them (dpkg or RPM),
//! closes over their dependencies and emits a CycloneDX component graph.
//! Documents of several targets can then be merged into one.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`sbom_generation`): Pure business logic and domain models
//! - **Application Layer** (`application`): Use cases and application services
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use buildbom::prelude::*;
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> Result<()> {
//! // Index the package database of the build root
//! let root = Path::new("/");
//! let indexer = open_package_database(root, Box::new(Dep5LicenseDetector::new()))?;
//! let rooted_fs = RootedFileSystem::new(root);
//!
//! // Create use case
//! let use_case = GenerateSbomUseCase::new(
//!     FileSystemReader::new(),
//!     indexer,
//!     rooted_fs.clone(),
//!     rooted_fs,
//!     StderrProgressReporter::new(),
//! );
//!
//! // Execute
//! let request = SbomRequest::new(
//!     PathBuf::from("observations.json"),
//!     "libfoo".to_string(),
//!     "1.0.0".to_string(),
//!     ObservationFilter::default(),
//! );
//! let response = use_case.execute(request)?;
//!
//! // Format output
//! let output = CycloneDxFormatter::new().format(&response.bom)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod ports;
pub mod sbom_generation;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, RootedFileSystem, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::CycloneDxFormatter;
    pub use crate::adapters::outbound::license::Dep5LicenseDetector;
    pub use crate::adapters::outbound::package_db::open_package_database;
    pub use crate::application::dto::{MergeRequest, MergeResponse, SbomRequest, SbomResponse};
    pub use crate::application::use_cases::{GenerateSbomUseCase, MergeSbomsUseCase};
    pub use crate::ports::inbound::{SbomGenerationPort, SbomMergePort};
    pub use crate::ports::outbound::{
        DocumentReader, FileHasher, LicenseDetector, LinkResolver, ObservationReader,
        OutputPresenter, PackageIndexer, ProgressReporter, SbomFormatter, SbomParser,
    };
    pub use crate::sbom_generation::domain::{
        Bom, Component, License, MetadataOverrides, Observations, OsFamily, Package, PackageId,
        Warning, WarningKind, Warnings,
    };
    pub use crate::sbom_generation::services::{ObservationFilter, SbomGenerator};
    pub use crate::shared::Result;
}
