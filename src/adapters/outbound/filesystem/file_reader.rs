use crate::ports::outbound::{DocumentReader, ObservationReader};
use crate::sbom_generation::domain::Observations;
use crate::shared::error::SbomError;
use crate::shared::security::{read_checked, MAX_INPUT_FILE_SIZE};
use crate::shared::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk shape of a build observation log
#[derive(Debug, Deserialize)]
struct ObservationLog {
    #[serde(default)]
    opened: Vec<PathBuf>,
    #[serde(default)]
    executed: Vec<PathBuf>,
}

/// FileSystemReader adapter for the files a user hands to the tool
///
/// Implements ObservationReader and DocumentReader. Every read goes through
/// the shared security checks: symbolic links are rejected, only regular
/// files are read, and sizes are capped.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    fn read_text(&self, path: &Path, file_type: &str) -> Result<String> {
        if !path.exists() {
            return Err(SbomError::FileReadError {
                path: path.to_path_buf(),
                details: format!("{} does not exist", file_type),
            }
            .into());
        }

        let bytes = read_checked(path, file_type, MAX_INPUT_FILE_SIZE)?;
        String::from_utf8(bytes).map_err(|e| {
            SbomError::FileReadError {
                path: path.to_path_buf(),
                details: format!("{} is not valid UTF-8: {}", file_type, e),
            }
            .into()
        })
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservationReader for FileSystemReader {
    fn read_observations(&self, path: &Path) -> Result<Observations> {
        let content = self.read_text(path, "observation log")?;

        let log: ObservationLog =
            serde_json::from_str(&content).map_err(|e| SbomError::ObservationParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        Ok(Observations::new(log.opened, log.executed))
    }
}

impl DocumentReader for FileSystemReader {
    fn read_document(&self, path: &Path) -> Result<String> {
        self.read_text(path, "SBOM document")
    }
}
