use super::License;
use std::collections::{BTreeMap, HashSet};

/// Lifecycle phase recorded in every document this tool assembles
pub const LIFECYCLE_BUILD: &str = "build";

/// Property name carrying a component's role in the build
pub const ROLE_PROPERTY: &str = "buildbom:role";

/// Role value for packages providing executed build tools
pub const ROLE_BUILD_TOOL: &str = "build-tool";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Library,
    Application,
    File,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Library => "library",
            ComponentType::Application => "application",
            ComponentType::File => "file",
        }
    }

    /// Parses a CycloneDX component type; types this tool doesn't emit map to `Library`
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "application" => ComponentType::Application,
            "file" => ComponentType::File,
            _ => ComponentType::Library,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Required,
    Optional,
    Excluded,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Required => "required",
            Scope::Optional => "optional",
            Scope::Excluded => "excluded",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "required" => Some(Scope::Required),
            "optional" => Some(Scope::Optional),
            "excluded" => Some(Scope::Excluded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hash {
    pub algorithm: String,
    pub value: String,
}

impl Hash {
    pub fn sha256(value: impl Into<String>) -> Self {
        Self {
            algorithm: "SHA-256".to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A tool that took part in producing the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub name: String,
    pub version: String,
}

impl Tool {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub component_type: ComponentType,
    pub bom_ref: String,
    pub name: String,
    pub group: Option<String>,
    pub version: String,
    pub purl: Option<String>,
    pub licenses: Vec<License>,
    pub scope: Option<Scope>,
    pub hashes: Vec<Hash>,
    pub properties: Vec<Property>,
    /// Nested sub-components (files of a build tool package)
    pub components: Vec<Component>,
}

impl Component {
    pub fn new(
        component_type: ComponentType,
        bom_ref: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            component_type,
            bom_ref: bom_ref.into(),
            name: name.into(),
            group: None,
            version: version.into(),
            purl: None,
            licenses: Vec::new(),
            scope: None,
            hashes: Vec::new(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    /// `(name, group, version)` identity used when comparing against the root
    pub fn identity(&self) -> (&str, Option<&str>, &str) {
        (&self.name, self.group.as_deref(), &self.version)
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BomMetadata {
    pub timestamp: String,
    pub tools: Vec<Tool>,
    /// The target the document describes; it roots the dependency graph
    pub component: Component,
    pub lifecycle: String,
    pub supplier: Option<String>,
    pub authors: Vec<String>,
    pub manufacturer: Option<String>,
}

/// Component-and-dependency graph of one SBOM document
#[derive(Debug, Clone, PartialEq)]
pub struct Bom {
    pub serial_number: String,
    pub version: u32,
    pub metadata: BomMetadata,
    pub components: Vec<Component>,
    /// Component reference -> references it depends on
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl Bom {
    pub fn root_ref(&self) -> &str {
        &self.metadata.component.bom_ref
    }

    pub fn find_component(&self, bom_ref: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.bom_ref == bom_ref)
    }

    /// Every reference defined in the document: root, components and nested components
    pub fn known_refs(&self) -> HashSet<String> {
        fn collect(components: &[Component], refs: &mut HashSet<String>) {
            for component in components {
                refs.insert(component.bom_ref.clone());
                collect(&component.components, refs);
            }
        }

        let mut refs = HashSet::new();
        refs.insert(self.root_ref().to_string());
        collect(&self.components, &mut refs);
        refs
    }
}

/// Caller-supplied values replacing the merged document's root identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverrides {
    pub name: Option<String>,
    pub version: Option<String>,
    pub group: Option<String>,
    pub license: Option<String>,
    pub supplier: Option<String>,
    pub author: Option<String>,
    pub manufacturer: Option<String>,
}

impl MetadataOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
