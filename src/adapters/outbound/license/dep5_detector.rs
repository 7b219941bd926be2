use crate::ports::outbound::LicenseDetector;
use crate::sbom_generation::domain::License;
use crate::shared::Result;
use std::path::Path;

/// Header line opening a machine-readable debian/copyright file
const DEP5_FORMAT_FIELD: &str = "Format:";

/// Confidence for a short name read from a machine-readable `License:` field
const FIELD_CONFIDENCE: f32 = 1.0;

/// Dep5LicenseDetector reads license short names from machine-readable
/// Debian copyright files (DEP-5).
///
/// Free-form copyright files are not classified and yield no licenses.
pub struct Dep5LicenseDetector;

impl Dep5LicenseDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Dep5LicenseDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseDetector for Dep5LicenseDetector {
    fn detect(&self, path: &Path, content: &[u8]) -> Result<Vec<License>> {
        if content.contains(&0) {
            anyhow::bail!("{} is not a text file", path.display());
        }
        let text = String::from_utf8_lossy(content);

        let is_machine_readable = text
            .lines()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| line.starts_with(DEP5_FORMAT_FIELD));
        if !is_machine_readable {
            return Ok(Vec::new());
        }

        let mut licenses: Vec<License> = Vec::new();
        for line in text.lines() {
            // Continuation lines hold the license text, not the short name
            let Some(value) = line.strip_prefix("License:") else {
                continue;
            };
            let expression = value.trim();
            if expression.is_empty() || licenses.iter().any(|l| l.expression() == expression) {
                continue;
            }

            let license = if expression.contains(char::is_whitespace) {
                License::new(
                    Some(path.to_path_buf()),
                    None,
                    expression.to_string(),
                    false,
                    FIELD_CONFIDENCE,
                )
            } else {
                License::detected(path, expression, FIELD_CONFIDENCE)
            };
            licenses.push(license);
        }

        Ok(licenses)
    }
}
