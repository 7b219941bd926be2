/// Mock implementations for testing
mod mock_filesystem;
mod mock_observation_reader;
mod mock_package_indexer;
mod mock_progress_reporter;

pub use mock_filesystem::{MockFileHasher, MockLinkResolver};
pub use mock_observation_reader::MockObservationReader;
pub use mock_package_indexer::MockPackageIndexer;
pub use mock_progress_reporter::MockProgressReporter;
