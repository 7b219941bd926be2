use crate::sbom_generation::domain::Observations;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// System include search paths whose headers count as code dependencies
pub const DEFAULT_INCLUDE_DIRS: &[&str] = &["/usr/include", "/usr/local/include", "/usr/lib/gcc"];

/// Header file extensions (without the leading dot)
pub const DEFAULT_HEADER_EXTENSIONS: &[&str] =
    &["h", "hh", "hpp", "hxx", "h++", "inc", "tcc", "ipp"];

/// Compiler, linker and build driver binary names
pub const DEFAULT_TOOLCHAIN_BINARIES: &[&str] = &[
    "cc", "c++", "gcc", "g++", "cpp", "clang", "clang++", "ld", "ld.bfd", "ld.gold", "ld.lld",
    "lld", "as", "ar", "ranlib", "nm", "objcopy", "strip", "cc1", "cc1plus", "collect2",
    "lto-wrapper", "lto1", "rustc", "cargo", "go", "make",
];

/// C++ standard library headers have no extension (`<vector>`, `<string>`)
const EXTENSIONLESS_HEADER_DIR: &str = "/usr/include/c++";

/// ObservationFilter narrows raw build observations to the ones that
/// identify dependencies: system headers that were opened and toolchain
/// binaries that were executed.
#[derive(Debug, Clone)]
pub struct ObservationFilter {
    include_dirs: Vec<PathBuf>,
    header_extensions: HashSet<String>,
    toolchain_binaries: HashSet<String>,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_INCLUDE_DIRS.iter().map(PathBuf::from).collect(),
            DEFAULT_HEADER_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_TOOLCHAIN_BINARIES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl ObservationFilter {
    pub fn new(
        include_dirs: Vec<PathBuf>,
        header_extensions: Vec<String>,
        toolchain_binaries: Vec<String>,
    ) -> Self {
        Self {
            include_dirs,
            header_extensions: header_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            toolchain_binaries: toolchain_binaries.into_iter().collect(),
        }
    }

    /// Keeps dependency-relevant observations, dropping duplicates while
    /// preserving first-seen order
    pub fn filter(&self, observations: Observations) -> Observations {
        Observations::new(
            unique(observations.opened.into_iter().filter(|p| self.is_system_header(p))),
            unique(
                observations
                    .executed
                    .into_iter()
                    .filter(|p| self.is_toolchain_binary(p)),
            ),
        )
    }

    pub fn is_system_header(&self, path: &Path) -> bool {
        if !self.include_dirs.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.header_extensions.contains(ext),
            None => path.starts_with(EXTENSIONLESS_HEADER_DIR),
        }
    }

    pub fn is_toolchain_binary(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let base = strip_version_suffix(file_name);

        self.toolchain_binaries.iter().any(|tool| {
            base == tool
                || base
                    .strip_suffix(tool.as_str())
                    .is_some_and(|prefix| prefix.ends_with('-'))
        })
    }
}

/// `gcc-12` -> `gcc`, `x86_64-linux-gnu-gcc-12.2` -> `x86_64-linux-gnu-gcc`
fn strip_version_suffix(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((head, tail))
            if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit() || c == '.') =>
        {
            head
        }
        _ => name,
    }
}

fn unique(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.filter(|p| seen.insert(p.clone())).collect()
}
