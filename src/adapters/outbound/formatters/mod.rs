/// Formatter adapters for SBOM document formats
mod cyclonedx_formatter;

pub use cyclonedx_formatter::CycloneDxFormatter;
