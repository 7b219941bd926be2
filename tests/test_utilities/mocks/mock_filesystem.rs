use buildbom::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Mock LinkResolver: paths with a registered target resolve to it,
/// every other path resolves to itself
#[derive(Default)]
pub struct MockLinkResolver {
    pub links: HashMap<PathBuf, PathBuf>,
    pub broken: HashSet<PathBuf>,
}

impl MockLinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, from: &str, to: &str) -> Self {
        self.links.insert(PathBuf::from(from), PathBuf::from(to));
        self
    }

    pub fn with_broken_link(mut self, path: &str) -> Self {
        self.broken.insert(PathBuf::from(path));
        self
    }
}

impl LinkResolver for MockLinkResolver {
    fn resolve_links(&self, path: &Path) -> Result<PathBuf> {
        if self.broken.contains(path) {
            anyhow::bail!("dangling symlink: {}", path.display());
        }
        Ok(self
            .links
            .get(path)
            .cloned()
            .unwrap_or_else(|| path.to_path_buf()))
    }
}

/// Mock FileHasher deriving a stable fake digest from the path
#[derive(Default)]
pub struct MockFileHasher {
    pub unreadable: HashSet<PathBuf>,
}

impl MockFileHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(PathBuf::from(path));
        self
    }

    pub fn digest_for(path: &Path) -> String {
        format!("{:0>64}", path.to_string_lossy().len())
    }
}

impl FileHasher for MockFileHasher {
    fn sha256(&self, path: &Path) -> Result<String> {
        if self.unreadable.contains(path) {
            anyhow::bail!("permission denied: {}", path.display());
        }
        Ok(Self::digest_for(path))
    }
}
