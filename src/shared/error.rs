use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// SBOM written successfully (possibly with warnings)
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (missing package database, attribution failure, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// What kind of observation could not be attributed to a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    /// A file opened by the build
    OpenedFile,
    /// A binary executed by the build
    ExecutedBinary,
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationKind::OpenedFile => write!(f, "opened file"),
            ObservationKind::ExecutedBinary => write!(f, "executed binary"),
        }
    }
}

/// Application-specific errors for SBOM generation.
///
/// Every variant here is fatal for the target being scanned. Recoverable
/// conditions are reported as warnings instead.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("No supported package database found under: {root}\nSearched: {searched}\n\n💡 Hint: buildbom supports dpkg (Debian/Ubuntu) and rpm (Fedora/RHEL/SUSE) systems. Use --root to point at the build's root filesystem")]
    PackageDatabaseNotFound { root: PathBuf, searched: String },

    #[error("Package database is invalid: {path}\nDetails: {details}\n\n💡 Hint: The database may be corrupt or written by an unsupported package manager version")]
    PackageDatabaseCorrupt { path: PathBuf, details: String },

    #[error("No installed package owns {kind}: {path}\n\n💡 Hint: Every observed file must belong to a package. Files created during the build should be filtered out of the observation log")]
    AttributionFailed { path: PathBuf, kind: ObservationKind },

    #[error("Failed to parse observation log: {path}\nDetails: {details}\n\n💡 Hint: The log must be JSON of the form {{\"opened\": [...], \"executed\": [...]}}")]
    ObservationParseError { path: PathBuf, details: String },

    #[error("Failed to parse SBOM document: {path}\nDetails: {details}\n\n💡 Hint: Only CycloneDX JSON documents can be merged")]
    DocumentParseError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid root path: {path}\nReason: {reason}\n\n💡 Hint: Please specify the root directory of the build environment")]
    InvalidRootPath { path: PathBuf, reason: String },

    /// Validation error for builder patterns
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}
