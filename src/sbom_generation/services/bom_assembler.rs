use super::purl::{generic_purl, package_url};
use crate::ports::outbound::FileHasher;
use crate::sbom_generation::domain::bom::{LIFECYCLE_BUILD, ROLE_BUILD_TOOL, ROLE_PROPERTY};
use crate::sbom_generation::domain::{
    Bom, BomMetadata, BuildDependencies, Component, ComponentType, Hash, PackageId, Partition,
    Property, ResolvedPackage, SbomMetadata, Scope, WarningKind, Warnings,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Property carrying the source RPM a binary RPM was built from
pub const SOURCE_RPM_PROPERTY: &str = "buildbom:source-rpm";

/// Builds the metadata component that roots a target's dependency graph
pub fn root_component(name: &str, version: &str) -> Component {
    Component::new(
        ComponentType::Application,
        generic_purl(name, version),
        name,
        version,
    )
}

/// BomAssembler turns resolved build dependencies into a component graph.
///
/// One component is created per unique package id; the first partition to
/// mention an id (code, then tools, then transitive) decides how it looks.
pub struct BomAssembler<'a, H: ?Sized> {
    hasher: &'a H,
}

impl<'a, H> BomAssembler<'a, H>
where
    H: FileHasher + ?Sized,
{
    pub fn new(hasher: &'a H) -> Self {
        Self { hasher }
    }

    pub fn assemble(
        &self,
        root: Component,
        dependencies: &BuildDependencies,
        metadata: &SbomMetadata,
        warnings: &mut Warnings,
    ) -> Bom {
        let mut refs: HashMap<PackageId, String> = HashMap::new();
        let mut first_seen: Vec<(Partition, &ResolvedPackage)> = Vec::new();
        for (partition, resolved) in dependencies.iter_by_priority() {
            let id = resolved.id();
            if refs.contains_key(&id) {
                continue;
            }
            refs.insert(id, package_url(resolved.package()));
            first_seen.push((partition, resolved));
        }

        let root_ref = root.bom_ref.clone();
        let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut root_edges = Vec::new();
        let mut components = Vec::with_capacity(first_seen.len());

        for (partition, resolved) in first_seen {
            let package = resolved.package();
            let bom_ref = refs[&resolved.id()].clone();

            if partition == Partition::Code && !package.is_source() && !root_edges.contains(&bom_ref) {
                root_edges.push(bom_ref.clone());
            }

            let edges = self.edges_for(resolved, &refs, warnings);
            graph.insert(bom_ref.clone(), edges);
            components.push(self.component_for(partition, resolved, bom_ref, warnings));
        }
        graph.insert(root_ref, root_edges);

        Bom {
            serial_number: metadata.serial_number().to_string(),
            version: 1,
            metadata: BomMetadata {
                timestamp: metadata.timestamp().to_string(),
                tools: vec![metadata.tool()],
                component: root,
                lifecycle: LIFECYCLE_BUILD.to_string(),
                supplier: None,
                authors: Vec::new(),
                manufacturer: None,
            },
            components,
            dependencies: graph,
        }
    }

    fn edges_for(
        &self,
        resolved: &ResolvedPackage,
        refs: &HashMap<PackageId, String>,
        warnings: &mut Warnings,
    ) -> Vec<String> {
        let mut edges = Vec::new();
        for target in resolved.dependency_ids() {
            match refs.get(target) {
                Some(target_ref) if !edges.contains(target_ref) => edges.push(target_ref.clone()),
                Some(_) => {}
                None => warnings.push(
                    WarningKind::DanglingEdge,
                    format!(
                        "Dropping edge {} -> {}: no component for the target",
                        resolved.id(),
                        target
                    ),
                ),
            }
        }
        edges
    }

    fn component_for(
        &self,
        partition: Partition,
        resolved: &ResolvedPackage,
        bom_ref: String,
        warnings: &mut Warnings,
    ) -> Component {
        let package = resolved.package();
        let component_type = if partition == Partition::Tools {
            ComponentType::Application
        } else {
            ComponentType::Library
        };

        let mut component = Component::new(component_type, bom_ref.clone(), package.name(), package.version());
        component.purl = Some(bom_ref.clone());
        component.licenses = package.licenses().to_vec();
        if let Some(source_rpm) = package.source_rpm() {
            component
                .properties
                .push(Property::new(SOURCE_RPM_PROPERTY, source_rpm));
        }

        if partition == Partition::Tools {
            component.scope = Some(Scope::Excluded);
            component
                .properties
                .push(Property::new(ROLE_PROPERTY, ROLE_BUILD_TOOL));
            component.components = package
                .files()
                .iter()
                .filter_map(|path| self.file_component(&bom_ref, path, warnings))
                .collect();
        }

        component
    }

    fn file_component(&self, parent_ref: &str, path: &Path, warnings: &mut Warnings) -> Option<Component> {
        let digest = match self.hasher.sha256(path) {
            Ok(digest) => digest,
            Err(e) => {
                warnings.push(
                    WarningKind::FileHash,
                    format!("Skipping file {}: {}", path.display(), e),
                );
                return None;
            }
        };

        let name = path.display().to_string();
        let mut file = Component::new(
            ComponentType::File,
            format!("{}#{}", parent_ref, name),
            name,
            "",
        );
        file.hashes.push(Hash::sha256(digest));
        Some(file)
    }
}
