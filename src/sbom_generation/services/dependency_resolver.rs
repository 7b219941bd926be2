use crate::ports::outbound::{LinkResolver, PackageIndexer};
use crate::sbom_generation::domain::package::SOURCE_ID_PREFIX;
use crate::sbom_generation::domain::{
    Observations, Package, PackageId, RawBuildDependencies, WarningKind, Warnings,
};
use crate::shared::error::{ObservationKind, SbomError};
use crate::shared::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// Virtual capability tokens (`rpmlib(PayloadIsZstd)`) name no package
const VIRTUAL_CAPABILITY_PREFIX: &str = "rpmlib(";

/// Returns true for dependency names that are never looked up in the database
pub fn is_unresolvable_name(name: &str) -> bool {
    name.starts_with(VIRTUAL_CAPABILITY_PREFIX) || name.starts_with(SOURCE_ID_PREFIX)
}

/// DependencyResolver maps observations to their owning packages and
/// computes the transitive dependency closure.
///
/// Attribution gaps are fatal: a single observed path without an owning
/// package aborts the run. Unresolvable dependency names are only warned about.
pub struct DependencyResolver<'a, I: ?Sized, L: ?Sized> {
    indexer: &'a I,
    link_resolver: &'a L,
    on_attributed: Option<&'a dyn Fn(usize, usize)>,
}

impl<'a, I, L> DependencyResolver<'a, I, L>
where
    I: PackageIndexer + ?Sized,
    L: LinkResolver + ?Sized,
{
    pub fn new(indexer: &'a I, link_resolver: &'a L) -> Self {
        Self {
            indexer,
            link_resolver,
            on_attributed: None,
        }
    }

    /// Registers a callback invoked with `(attributed, total)` after each observed path
    pub fn with_progress(mut self, on_attributed: &'a dyn Fn(usize, usize)) -> Self {
        self.on_attributed = Some(on_attributed);
        self
    }

    /// Resolves filtered observations into code, tool and transitive packages,
    /// each sorted by name then version
    ///
    /// # Errors
    /// Returns [`SbomError::AttributionFailed`] if any observed path has no owner
    pub fn resolve(
        &self,
        observations: &Observations,
        warnings: &mut Warnings,
    ) -> Result<RawBuildDependencies> {
        let total = observations.len();
        let mut attributed = 0;

        let mut code = DirectPackages::default();
        for path in &observations.opened {
            let package = self.attribute(path, ObservationKind::OpenedFile)?;
            code.insert(package, None, self, warnings)?;
            attributed += 1;
            self.notify(attributed, total);
        }

        let mut tools = DirectPackages::default();
        for path in &observations.executed {
            let resolved = match self.link_resolver.resolve_links(path) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warnings.push(
                        WarningKind::SymlinkResolution,
                        format!(
                            "Could not resolve symlinks of {}: {}; trying the path as observed",
                            path.display(),
                            e
                        ),
                    );
                    path.clone()
                }
            };
            let package = self.attribute(&resolved, ObservationKind::ExecutedBinary)?;
            tools.insert(package, Some(resolved.as_path()), self, warnings)?;
            attributed += 1;
            self.notify(attributed, total);
        }

        let mut code = code.into_vec();
        let mut tools = tools.into_vec();
        let mut transitive = self.transitive_closure(&code, &tools, warnings);

        sort_packages(&mut code);
        sort_packages(&mut tools);
        sort_packages(&mut transitive);

        Ok(RawBuildDependencies {
            code,
            tools,
            transitive,
        })
    }

    fn notify(&self, attributed: usize, total: usize) {
        if let Some(on_attributed) = self.on_attributed {
            on_attributed(attributed, total);
        }
    }

    fn attribute(&self, path: &Path, kind: ObservationKind) -> Result<Package> {
        self.indexer.package_for_file(path).ok_or_else(|| {
            SbomError::AttributionFailed {
                path: path.to_path_buf(),
                kind,
            }
            .into()
        })
    }

    fn with_licenses(&self, package: Package, warnings: &mut Warnings) -> Package {
        if package.is_source() {
            return package;
        }
        match self.indexer.licenses_for_package(package.name()) {
            Ok(licenses) => package.with_licenses(licenses),
            Err(e) => {
                warnings.push(
                    WarningKind::LicenseDetection,
                    format!("License detection failed for {}: {}", package.id(), e),
                );
                package
            }
        }
    }

    /// Walks declared dependency names breadth-first from every direct package.
    ///
    /// Packages already in `code`/`tools`, or already collected, are not
    /// revisited, which also terminates dependency cycles.
    fn transitive_closure(
        &self,
        code: &[Package],
        tools: &[Package],
        warnings: &mut Warnings,
    ) -> Vec<Package> {
        let mut visited: HashSet<PackageId> = code.iter().chain(tools).map(Package::id).collect();
        let mut queue: VecDeque<String> = code
            .iter()
            .chain(tools)
            .flat_map(|p| p.depends().iter().cloned())
            .collect();
        let mut looked_up: HashSet<String> = HashSet::new();
        let mut transitive = Vec::new();

        while let Some(name) = queue.pop_front() {
            if is_unresolvable_name(&name) || !looked_up.insert(name.clone()) {
                continue;
            }

            let Some(package) = self.indexer.package_that_provides(&name) else {
                warnings.push(
                    WarningKind::UnresolvedDependency,
                    format!("No installed package provides '{}'; skipping it", name),
                );
                continue;
            };

            if !visited.insert(package.id()) {
                continue;
            }

            queue.extend(package.depends().iter().cloned());
            transitive.push(self.with_licenses(package, warnings));
        }

        transitive
    }
}

/// Direct attributions of one partition, deduplicated by package id
#[derive(Default)]
struct DirectPackages {
    packages: Vec<Package>,
    positions: HashMap<PackageId, usize>,
}

impl DirectPackages {
    fn insert<I, L>(
        &mut self,
        mut package: Package,
        observed_file: Option<&Path>,
        resolver: &DependencyResolver<'_, I, L>,
        warnings: &mut Warnings,
    ) -> Result<()>
    where
        I: PackageIndexer + ?Sized,
        L: LinkResolver + ?Sized,
    {
        let id = package.id();
        if let Some(&position) = self.positions.get(&id) {
            if let Some(file) = observed_file {
                self.packages[position].add_file(file.to_path_buf());
            }
            return Ok(());
        }

        if let Some(file) = observed_file {
            package.add_file(file.to_path_buf());
        }

        let source = match package.distinct_source() {
            Some(source) => Some(Package::source_pseudo_package(
                source,
                package.os_family().clone(),
            )?),
            None => None,
        };
        if let Some(source) = &source {
            package.add_dependency(source.id().to_string());
        }

        let package = resolver.with_licenses(package, warnings);
        self.positions.insert(id, self.packages.len());
        self.packages.push(package);

        if let Some(source) = source {
            let source_id = source.id();
            if !self.positions.contains_key(&source_id) {
                self.positions.insert(source_id, self.packages.len());
                self.packages.push(source);
            }
        }

        Ok(())
    }

    fn into_vec(self) -> Vec<Package> {
        self.packages
    }
}

fn sort_packages(packages: &mut [Package]) {
    packages.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}
