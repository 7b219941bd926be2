use super::{Package, ResolvedPackage};

/// Packages a build depended on, before dependency names are rewritten to ids.
///
/// `code` and `tools` may hold the same package; `transitive` never holds a
/// package already present in either of them.
#[derive(Debug, Clone, Default)]
pub struct RawBuildDependencies {
    pub code: Vec<Package>,
    pub tools: Vec<Package>,
    pub transitive: Vec<Package>,
}

/// BuildDependencies aggregate: the three partitions with dependency ids resolved
#[derive(Debug, Clone, Default)]
pub struct BuildDependencies {
    pub code: Vec<ResolvedPackage>,
    pub tools: Vec<ResolvedPackage>,
    pub transitive: Vec<ResolvedPackage>,
}

impl BuildDependencies {
    pub fn total_package_count(&self) -> usize {
        self.code.len() + self.tools.len() + self.transitive.len()
    }

    /// All packages in partition priority order: code, then tools, then transitive
    pub fn iter_by_priority(&self) -> impl Iterator<Item = (Partition, &ResolvedPackage)> {
        self.code
            .iter()
            .map(|p| (Partition::Code, p))
            .chain(self.tools.iter().map(|p| (Partition::Tools, p)))
            .chain(self.transitive.iter().map(|p| (Partition::Transitive, p)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Code,
    Tools,
    Transitive,
}
