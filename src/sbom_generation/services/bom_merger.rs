use super::purl::generic_purl;
use crate::sbom_generation::domain::{
    Bom, License, MetadataOverrides, WarningKind, Warnings,
};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::collections::{BTreeMap, HashMap, HashSet};

/// BomMerger folds independently assembled documents into one.
///
/// The first document is the accumulator. Every later document's root is
/// mapped onto the accumulator's root so it becomes a subtree instead of a
/// second root; components are first-writer-wins by reference and edge
/// lists are unioned.
pub struct BomMerger;

impl BomMerger {
    /// Folds `documents` into the first one, then applies `overrides`.
    ///
    /// Components duplicating the root identity are only removed when
    /// overrides are given, so a single document without overrides comes
    /// back unchanged. Edges naming an unknown component are always
    /// dropped with a `DanglingEdge` warning; such a document is returned
    /// without those edges.
    ///
    /// # Errors
    /// Returns a validation error if `documents` is empty
    pub fn merge(
        documents: Vec<Bom>,
        overrides: &MetadataOverrides,
        warnings: &mut Warnings,
    ) -> Result<Bom> {
        let mut documents = documents.into_iter();
        let Some(mut merged) = documents.next() else {
            return Err(SbomError::Validation {
                message: "At least one document is required to merge".to_string(),
            }
            .into());
        };

        for document in documents {
            Self::fold(&mut merged, document);
        }

        if !overrides.is_empty() {
            Self::apply_overrides(&mut merged, overrides);
            Self::remove_root_duplicates(&mut merged);
        }
        Self::drop_dangling_edges(&mut merged, warnings);
        Ok(merged)
    }

    fn fold(acc: &mut Bom, incoming: Bom) {
        let root_ref = acc.root_ref().to_string();
        let incoming_root = incoming.root_ref().to_string();
        let remap = |r: String| if r == incoming_root { root_ref.clone() } else { r };

        let mut existing: HashSet<String> = acc.components.iter().map(|c| c.bom_ref.clone()).collect();
        for component in incoming.components {
            if existing.insert(component.bom_ref.clone()) {
                acc.components.push(component);
            }
        }

        for (source, targets) in incoming.dependencies {
            let targets = targets.into_iter().map(&remap).collect();
            union_edges(&mut acc.dependencies, remap(source), targets);
        }

        for tool in incoming.metadata.tools {
            if !acc.metadata.tools.contains(&tool) {
                acc.metadata.tools.push(tool);
            }
        }
    }

    fn apply_overrides(bom: &mut Bom, overrides: &MetadataOverrides) {
        let metadata = &mut bom.metadata;
        if let Some(name) = &overrides.name {
            metadata.component.name = name.clone();
        }
        if let Some(version) = &overrides.version {
            metadata.component.version = version.clone();
        }
        if let Some(group) = &overrides.group {
            metadata.component.group = Some(group.clone());
        }
        if let Some(license) = &overrides.license {
            metadata.component.licenses = vec![License::declared(license)];
        }
        if let Some(supplier) = &overrides.supplier {
            metadata.supplier = Some(supplier.clone());
        }
        if let Some(author) = &overrides.author {
            metadata.authors = vec![author.clone()];
        }
        if let Some(manufacturer) = &overrides.manufacturer {
            metadata.manufacturer = Some(manufacturer.clone());
        }

        if overrides.name.is_some() || overrides.version.is_some() {
            let old_ref = metadata.component.bom_ref.clone();
            let new_ref = generic_purl(&metadata.component.name, &metadata.component.version);
            metadata.component.bom_ref = new_ref.clone();
            rename_ref(&mut bom.dependencies, &HashMap::from([(old_ref, new_ref)]));
        }
    }

    /// The root lives in document metadata, so a component carrying the
    /// root's identity is removed and its edges are folded into the root's.
    fn remove_root_duplicates(bom: &mut Bom) {
        let root_ref = bom.root_ref().to_string();
        let root_identity = {
            let (name, group, version) = bom.metadata.component.identity();
            (name.to_string(), group.map(str::to_string), version.to_string())
        };

        let mut renames = HashMap::new();
        bom.components.retain(|component| {
            let (name, group, version) = component.identity();
            let duplicate = name == root_identity.0
                && group == root_identity.1.as_deref()
                && version == root_identity.2;
            if duplicate && component.bom_ref != root_ref {
                renames.insert(component.bom_ref.clone(), root_ref.clone());
            }
            !duplicate
        });

        if !renames.is_empty() {
            rename_ref(&mut bom.dependencies, &renames);
        }
    }

    fn drop_dangling_edges(bom: &mut Bom, warnings: &mut Warnings) {
        let known = bom.known_refs();

        bom.dependencies.retain(|source, _| {
            let keep = known.contains(source);
            if !keep {
                warnings.push(
                    WarningKind::DanglingEdge,
                    format!("Dropping edges of unknown component {}", source),
                );
            }
            keep
        });

        for (source, targets) in bom.dependencies.iter_mut() {
            targets.retain(|target| {
                let keep = known.contains(target);
                if !keep {
                    warnings.push(
                        WarningKind::DanglingEdge,
                        format!("Dropping edge {} -> {}: unknown component", source, target),
                    );
                }
                keep
            });
        }
    }
}

/// Inserts `targets` under `source`, unioning with an existing edge list
/// without duplicates and keeping first-seen order
fn union_edges(graph: &mut BTreeMap<String, Vec<String>>, source: String, targets: Vec<String>) {
    let entry = graph.entry(source.clone()).or_default();
    for target in targets {
        if target != source && !entry.contains(&target) {
            entry.push(target);
        }
    }
}

fn rename_ref(graph: &mut BTreeMap<String, Vec<String>>, renames: &HashMap<String, String>) {
    let rename = |r: String| renames.get(&r).cloned().unwrap_or(r);
    let old = std::mem::take(graph);
    for (source, targets) in old {
        let targets = targets.into_iter().map(rename).collect();
        union_edges(graph, rename(source), targets);
    }
}
