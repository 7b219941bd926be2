use super::dependency_resolver::is_unresolvable_name;
use crate::ports::outbound::PackageIndexer;
use crate::sbom_generation::domain::{
    BuildDependencies, Package, PackageId, RawBuildDependencies, ResolvedPackage, WarningKind,
    Warnings,
};
use std::collections::HashSet;

/// DependencyIdRewriter turns raw dependency names into canonical package ids.
///
/// This is the second pipeline stage after [`super::DependencyResolver`]:
/// it consumes the raw partitions and produces new resolved values without
/// touching the input packages. Names that no longer resolve are dropped
/// from the edge list.
pub struct DependencyIdRewriter<'a, I: ?Sized> {
    indexer: &'a I,
}

impl<'a, I> DependencyIdRewriter<'a, I>
where
    I: PackageIndexer + ?Sized,
{
    pub fn new(indexer: &'a I) -> Self {
        Self { indexer }
    }

    pub fn rewrite(&self, raw: RawBuildDependencies, warnings: &mut Warnings) -> BuildDependencies {
        BuildDependencies {
            code: self.rewrite_all(raw.code, warnings),
            tools: self.rewrite_all(raw.tools, warnings),
            transitive: self.rewrite_all(raw.transitive, warnings),
        }
    }

    fn rewrite_all(&self, packages: Vec<Package>, warnings: &mut Warnings) -> Vec<ResolvedPackage> {
        packages
            .into_iter()
            .map(|p| self.rewrite_package(p, warnings))
            .collect()
    }

    fn rewrite_package(&self, package: Package, warnings: &mut Warnings) -> ResolvedPackage {
        let own_id = package.id();
        let mut seen = HashSet::new();
        let mut dependency_ids = Vec::new();

        for name in package.depends() {
            let id = if let Some(source_id) = PackageId::source_ref(name) {
                source_id
            } else if is_unresolvable_name(name) {
                continue;
            } else if let Some(target) = self.indexer.package_that_provides(name) {
                target.id()
            } else {
                warnings.push(
                    WarningKind::UnresolvedDependency,
                    format!("Dropping edge {} -> '{}': no installed package provides it", own_id, name),
                );
                continue;
            };

            // RPM packages commonly require capabilities they provide themselves
            if id != own_id && seen.insert(id.clone()) {
                dependency_ids.push(id);
            }
        }

        ResolvedPackage::new(package, dependency_ids)
    }
}
