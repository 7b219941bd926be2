//! Configuration file support for buildbom.
//!
//! Provides YAML-based configuration through `buildbom.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::sbom_generation::domain::MetadataOverrides;
use crate::sbom_generation::services::{
    ObservationFilter, DEFAULT_HEADER_EXTENSIONS, DEFAULT_INCLUDE_DIRS, DEFAULT_TOOLCHAIN_BINARIES,
};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "buildbom.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Filesystem root holding the package database
    pub root: Option<PathBuf>,
    /// Replaces the default system include directories
    pub include_dirs: Option<Vec<String>>,
    /// Replaces the default header extensions
    pub header_extensions: Option<Vec<String>>,
    /// Replaces the default toolchain binary names
    pub toolchain_binaries: Option<Vec<String>>,
    /// Root identity overrides for `merge`
    pub metadata: Option<MetadataConfig>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// The `metadata:` section.
#[derive(Debug, Deserialize, Default)]
pub struct MetadataConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    pub group: Option<String>,
    pub license: Option<String>,
    pub supplier: Option<String>,
    pub author: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// Builds the observation filter, falling back to the built-in defaults
    /// for every list the file leaves out
    pub fn observation_filter(&self) -> ObservationFilter {
        ObservationFilter::new(
            self.include_dirs
                .clone()
                .unwrap_or_else(|| defaults(DEFAULT_INCLUDE_DIRS))
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            self.header_extensions
                .clone()
                .unwrap_or_else(|| defaults(DEFAULT_HEADER_EXTENSIONS)),
            self.toolchain_binaries
                .clone()
                .unwrap_or_else(|| defaults(DEFAULT_TOOLCHAIN_BINARIES)),
        )
    }

    pub fn metadata_overrides(&self) -> MetadataOverrides {
        let Some(metadata) = &self.metadata else {
            return MetadataOverrides::default();
        };
        MetadataOverrides {
            name: metadata.name.clone(),
            version: metadata.version.clone(),
            group: metadata.group.clone(),
            license: metadata.license.clone(),
            supplier: metadata.supplier.clone(),
            author: metadata.author.clone(),
            manufacturer: metadata.manufacturer.clone(),
        }
    }
}

fn defaults(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    // An empty file is a valid (empty) configuration
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    let lists = [
        ("include_dirs", &config.include_dirs),
        ("header_extensions", &config.header_extensions),
        ("toolchain_binaries", &config.toolchain_binaries),
    ];
    for (field, values) in lists {
        let Some(values) = values else { continue };
        for (i, value) in values.iter().enumerate() {
            if value.trim().is_empty() {
                bail!(
                    "Invalid config: {}[{}] must not be empty.\n\n\
                     💡 Hint: Remove the empty entry or the whole '{}' list to use the defaults.",
                    field,
                    i,
                    field
                );
            }
        }
    }

    if let Some(root) = &config.root {
        if root.as_os_str().is_empty() {
            bail!("Invalid config: root must not be empty.\n\n💡 Hint: Omit 'root' to use '/'.");
        }
    }

    if let Some(metadata) = &config.metadata {
        let fields = [
            ("name", &metadata.name),
            ("version", &metadata.version),
            ("group", &metadata.group),
            ("license", &metadata.license),
            ("supplier", &metadata.supplier),
            ("author", &metadata.author),
            ("manufacturer", &metadata.manufacturer),
        ];
        for (field, value) in fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                bail!(
                    "Invalid config: metadata.{} must not be empty.\n\n\
                     💡 Hint: Remove the field to keep the value from the merged documents.",
                    field
                );
            }
        }
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!("⚠️  Warning: Unknown config field '{}' will be ignored.", key);
    }
    if let Some(metadata) = &config.metadata {
        for key in metadata.unknown_fields.keys() {
            eprintln!(
                "⚠️  Warning: Unknown config field 'metadata.{}' will be ignored.",
                key
            );
        }
    }
}
