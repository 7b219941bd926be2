/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (package databases, file system, console, etc.).
pub mod filesystem_access;
pub mod formatter;
pub mod input_reader;
pub mod license_detector;
pub mod output_presenter;
pub mod package_indexer;
pub mod progress_reporter;

pub use filesystem_access::{FileHasher, LinkResolver};
pub use formatter::{SbomFormatter, SbomParser};
pub use input_reader::{DocumentReader, ObservationReader};
pub use license_detector::LicenseDetector;
pub use output_presenter::OutputPresenter;
pub use package_indexer::PackageIndexer;
pub use progress_reporter::ProgressReporter;
