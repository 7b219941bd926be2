use super::Tool;

/// Document-level values stamped on every generated SBOM
#[derive(Debug, Clone)]
pub struct SbomMetadata {
    timestamp: String,
    tool_name: String,
    tool_version: String,
    serial_number: String,
}

impl SbomMetadata {
    pub fn new(
        timestamp: String,
        tool_name: String,
        tool_version: String,
        serial_number: String,
    ) -> Self {
        Self {
            timestamp,
            tool_name,
            tool_version,
            serial_number,
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// The generating tool as it appears in the document's tool list
    pub fn tool(&self) -> Tool {
        Tool::new(self.tool_name.clone(), self.tool_version.clone())
    }
}
