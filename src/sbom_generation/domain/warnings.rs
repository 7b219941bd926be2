use std::fmt;

/// Category of a recoverable problem met while building or merging an SBOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// An executed binary's symlink chain could not be resolved
    SymlinkResolution,
    /// A dependency name matched no installed package; the edge was dropped
    UnresolvedDependency,
    /// License detection failed for a package; it has no licenses
    LicenseDetection,
    /// A build tool file could not be hashed; its sub-component was skipped
    FileHash,
    /// A dependency edge pointed at a component missing from the document
    DanglingEdge,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::SymlinkResolution => "symlink-resolution",
            WarningKind::UnresolvedDependency => "unresolved-dependency",
            WarningKind::LicenseDetection => "license-detection",
            WarningKind::FileHash => "file-hash",
            WarningKind::DanglingEdge => "dangling-edge",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Diagnostics context handed to each pipeline stage.
///
/// Stages push recoverable problems here instead of logging them, so a
/// degraded-but-successful run is visible to the caller.
#[derive(Debug, Default, Clone)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: WarningKind, message: impl Into<String>) {
        self.entries.push(Warning {
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.entries.iter().filter(|w| w.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}
