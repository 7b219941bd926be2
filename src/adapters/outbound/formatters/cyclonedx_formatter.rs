use crate::ports::outbound::{SbomFormatter, SbomParser};
use crate::sbom_generation::domain::{self, ComponentType, Hash, Property, Scope};
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const BOM_FORMAT: &str = "CycloneDX";
const SPEC_VERSION: &str = "1.6";

#[derive(Debug, Serialize, Deserialize)]
struct Bom {
    #[serde(rename = "bomFormat")]
    bom_format: String,
    #[serde(rename = "specVersion")]
    spec_version: String,
    #[serde(default = "default_version")]
    version: u32,
    #[serde(rename = "serialNumber", default)]
    serial_number: String,
    metadata: Metadata,
    #[serde(default)]
    components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
struct Dependency {
    #[serde(rename = "ref")]
    bom_ref: String,
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    #[serde(default)]
    timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lifecycles: Vec<Lifecycle>,
    #[serde(default, skip_serializing_if = "Tools::is_empty")]
    tools: Tools,
    component: Option<Component>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    authors: Vec<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manufacturer: Option<Contact>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Lifecycle {
    phase: String,
}

/// CycloneDX 1.5 moved tools into an object; older documents use a plain array
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Tools {
    Components { components: Vec<Tool> },
    Legacy(Vec<Tool>),
}

impl Default for Tools {
    fn default() -> Self {
        Tools::Components {
            components: Vec::new(),
        }
    }
}

impl Tools {
    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn as_slice(&self) -> &[Tool] {
        match self {
            Tools::Components { components } => components,
            Tools::Legacy(tools) => tools,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Tool {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    tool_type: Option<String>,
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Contact {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Component {
    #[serde(rename = "type")]
    component_type: String,
    #[serde(rename = "bom-ref", default, skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<HashEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<LicenseChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    properties: Vec<PropertyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<Component>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HashEntry {
    alg: String,
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyEntry {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LicenseChoice {
    License { license: LicenseContent },
    Expression { expression: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct LicenseContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// CycloneDxFormatter adapter for CycloneDX 1.6 JSON
///
/// Implements SbomFormatter for output and SbomParser so documents from
/// earlier runs or other scanners can be merged.
pub struct CycloneDxFormatter;

impl CycloneDxFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CycloneDxFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomFormatter for CycloneDxFormatter {
    fn format(&self, bom: &domain::Bom) -> Result<String> {
        let metadata = &bom.metadata;
        let document = Bom {
            bom_format: BOM_FORMAT.to_string(),
            spec_version: SPEC_VERSION.to_string(),
            version: bom.version,
            serial_number: bom.serial_number.clone(),
            metadata: Metadata {
                timestamp: metadata.timestamp.clone(),
                lifecycles: vec![Lifecycle {
                    phase: metadata.lifecycle.clone(),
                }],
                tools: Tools::Components {
                    components: metadata
                        .tools
                        .iter()
                        .map(|t| Tool {
                            tool_type: Some("application".to_string()),
                            name: t.name.clone(),
                            version: t.version.clone(),
                        })
                        .collect(),
                },
                component: Some(to_wire(&metadata.component)),
                authors: metadata
                    .authors
                    .iter()
                    .map(|name| Contact { name: name.clone() })
                    .collect(),
                supplier: metadata.supplier.clone().map(|name| Contact { name }),
                manufacturer: metadata.manufacturer.clone().map(|name| Contact { name }),
            },
            components: bom.components.iter().map(to_wire).collect(),
            dependencies: bom
                .dependencies
                .iter()
                .map(|(bom_ref, depends_on)| Dependency {
                    bom_ref: bom_ref.clone(),
                    depends_on: depends_on.clone(),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&document).map_err(Into::into)
    }
}

impl SbomParser for CycloneDxFormatter {
    fn parse(&self, content: &str) -> Result<domain::Bom> {
        let document: Bom = serde_json::from_str(content)?;
        if document.bom_format != BOM_FORMAT {
            anyhow::bail!("bomFormat is '{}', expected '{}'", document.bom_format, BOM_FORMAT);
        }

        let Some(root) = document.metadata.component else {
            anyhow::bail!("document has no metadata.component to root its dependency graph");
        };

        let mut dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for dependency in document.dependencies {
            let targets = dependencies.entry(dependency.bom_ref).or_default();
            for target in dependency.depends_on {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }

        Ok(domain::Bom {
            serial_number: document.serial_number,
            version: document.version,
            metadata: domain::BomMetadata {
                timestamp: document.metadata.timestamp,
                tools: document
                    .metadata
                    .tools
                    .as_slice()
                    .iter()
                    .map(|t| domain::Tool::new(t.name.clone(), t.version.clone()))
                    .collect(),
                component: from_wire(root),
                lifecycle: document
                    .metadata
                    .lifecycles
                    .into_iter()
                    .next()
                    .map(|l| l.phase)
                    .unwrap_or_default(),
                supplier: document.metadata.supplier.map(|c| c.name),
                authors: document.metadata.authors.into_iter().map(|c| c.name).collect(),
                manufacturer: document.metadata.manufacturer.map(|c| c.name),
            },
            components: document.components.into_iter().map(from_wire).collect(),
            dependencies,
        })
    }
}

fn to_wire(component: &domain::Component) -> Component {
    Component {
        component_type: component.component_type.as_str().to_string(),
        bom_ref: Some(component.bom_ref.clone()),
        group: component.group.clone(),
        name: component.name.clone(),
        version: component.version.clone(),
        scope: component.scope.map(|s| s.as_str().to_string()),
        hashes: component
            .hashes
            .iter()
            .map(|h| HashEntry {
                alg: h.algorithm.clone(),
                content: h.value.clone(),
            })
            .collect(),
        licenses: component.licenses.iter().map(license_to_wire).collect(),
        purl: component.purl.clone(),
        properties: component
            .properties
            .iter()
            .map(|p| PropertyEntry {
                name: p.name.clone(),
                value: p.value.clone(),
            })
            .collect(),
        components: component.components.iter().map(to_wire).collect(),
    }
}

/// Declared identifiers are SPDX ids; detected short names (DEP-5) are not,
/// so they go into `name`
fn license_to_wire(license: &domain::License) -> LicenseChoice {
    match (license.is_declared(), license.id()) {
        (true, Some(id)) => LicenseChoice::License {
            license: LicenseContent {
                id: Some(id.to_string()),
                name: None,
            },
        },
        (false, Some(_)) => LicenseChoice::License {
            license: LicenseContent {
                id: None,
                name: Some(license.expression().to_string()),
            },
        },
        (_, None) => LicenseChoice::Expression {
            expression: license.expression().to_string(),
        },
    }
}

fn license_from_wire(choice: LicenseChoice) -> Option<domain::License> {
    match choice {
        LicenseChoice::License { license } => match (license.id, license.name) {
            (Some(id), _) => Some(domain::License::declared(&id)),
            (None, Some(name)) => Some(domain::License::new(None, Some(name.clone()), name, false, 1.0)),
            (None, None) => None,
        },
        LicenseChoice::Expression { expression } => Some(domain::License::declared(&expression)),
    }
}

fn from_wire(component: Component) -> domain::Component {
    let bom_ref = component.bom_ref.clone().unwrap_or_else(|| {
        component
            .purl
            .clone()
            .unwrap_or_else(|| format!("{}@{}", component.name, component.version))
    });

    domain::Component {
        component_type: ComponentType::from_str_loose(&component.component_type),
        bom_ref,
        name: component.name,
        group: component.group,
        version: component.version,
        purl: component.purl,
        licenses: component
            .licenses
            .into_iter()
            .filter_map(license_from_wire)
            .collect(),
        scope: component.scope.as_deref().and_then(Scope::from_str_loose),
        hashes: component
            .hashes
            .into_iter()
            .map(|h| Hash {
                algorithm: h.alg,
                value: h.content,
            })
            .collect(),
        properties: component
            .properties
            .into_iter()
            .map(|p| Property::new(p.name, p.value))
            .collect(),
        components: component.components.into_iter().map(from_wire).collect(),
    }
}
