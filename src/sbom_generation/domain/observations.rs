use std::path::PathBuf;

/// File-access observations recorded while a build ran.
///
/// `opened` are files the build opened, `executed` are binaries it ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observations {
    pub opened: Vec<PathBuf>,
    pub executed: Vec<PathBuf>,
}

impl Observations {
    pub fn new(opened: Vec<PathBuf>, executed: Vec<PathBuf>) -> Self {
        Self { opened, executed }
    }

    pub fn is_empty(&self) -> bool {
        self.opened.is_empty() && self.executed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.opened.len() + self.executed.len()
    }
}
