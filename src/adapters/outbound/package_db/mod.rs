/// Package database adapters: dpkg and RPM implementations of the
/// PackageIndexer port, plus environment probing to pick one
mod deb_control;
mod detect;
mod dpkg_indexer;
mod index;
mod rpm_header;
mod rpm_indexer;

pub use detect::{detect_package_manager, open_package_database, read_os_family};
pub use dpkg_indexer::{DpkgIndexer, DPKG_INFO_DIR, DPKG_STATUS_PATH};
pub use rpm_indexer::{RpmIndexer, RPMDB_CANDIDATES};
