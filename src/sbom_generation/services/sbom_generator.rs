use crate::sbom_generation::domain::SbomMetadata;
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Name recorded in the tool list of every document this crate produces
pub const TOOL_NAME: &str = "buildbom";

/// SbomGenerator service for document-level metadata
///
/// Every document gets a fresh RFC 3339 timestamp and a `urn:uuid:` serial number.
pub struct SbomGenerator;

impl SbomGenerator {
    pub fn generate_metadata(tool_name: &str, tool_version: &str) -> SbomMetadata {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let serial_number = format!("urn:uuid:{}", Uuid::new_v4());

        SbomMetadata::new(
            timestamp,
            tool_name.to_string(),
            tool_version.to_string(),
            serial_number,
        )
    }

    /// Metadata naming this crate, at its compile-time version
    pub fn generate_default_metadata() -> SbomMetadata {
        Self::generate_metadata(TOOL_NAME, env!("CARGO_PKG_VERSION"))
    }
}
