use crate::ports::outbound::{FileHasher, LinkResolver};
use crate::shared::Result;
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

/// Same limit the kernel applies to symlink chains
const MAX_LINK_HOPS: usize = 40;

/// RootedFileSystem adapter: path operations inside a build root
///
/// Observed paths are absolute paths as the build saw them. When the build
/// ran in a chroot or container image, `root` is where that filesystem is
/// mounted on the host; absolute link targets are resolved against it.
#[derive(Debug, Clone)]
pub struct RootedFileSystem {
    root: PathBuf,
}

impl RootedFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Host location of a path inside the root
    pub fn host_path(&self, path: &Path) -> PathBuf {
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }
}

/// Components still to walk, innermost last so `pop` yields the next one
fn pending_components(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_os_string()),
            Component::ParentDir => Some(OsString::from("..")),
            _ => None,
        })
        .rev()
        .collect()
}

impl LinkResolver for RootedFileSystem {
    fn resolve_links(&self, path: &Path) -> Result<PathBuf> {
        let mut pending = pending_components(path);
        let mut resolved = PathBuf::from("/");
        let mut hops = 0;

        while let Some(name) = pending.pop() {
            if name == ".." {
                resolved.pop();
                continue;
            }

            let candidate = resolved.join(&name);
            let host = self.host_path(&candidate);
            let metadata = fs::symlink_metadata(&host)
                .map_err(|e| anyhow::anyhow!("Failed to resolve {}: {}", candidate.display(), e))?;

            if !metadata.is_symlink() {
                resolved = candidate;
                continue;
            }

            hops += 1;
            if hops > MAX_LINK_HOPS {
                anyhow::bail!("Too many levels of symbolic links: {}", path.display());
            }
            let target = fs::read_link(&host)?;
            if target.is_absolute() {
                resolved = PathBuf::from("/");
            }
            pending.extend(pending_components(&target));
        }

        Ok(resolved)
    }
}

impl FileHasher for RootedFileSystem {
    fn sha256(&self, path: &Path) -> Result<String> {
        let host = self.host_path(path);
        let mut file = File::open(&host)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;

        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }
}
