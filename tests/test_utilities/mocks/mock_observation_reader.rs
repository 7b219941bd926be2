use buildbom::prelude::*;
use std::path::{Path, PathBuf};

/// Mock ObservationReader returning a fixed observation log
pub struct MockObservationReader {
    pub opened: Vec<PathBuf>,
    pub executed: Vec<PathBuf>,
}

impl MockObservationReader {
    pub fn new(opened: &[&str], executed: &[&str]) -> Self {
        Self {
            opened: opened.iter().map(PathBuf::from).collect(),
            executed: executed.iter().map(PathBuf::from).collect(),
        }
    }
}

impl ObservationReader for MockObservationReader {
    fn read_observations(&self, _path: &Path) -> Result<Observations> {
        Ok(Observations::new(self.opened.clone(), self.executed.clone()))
    }
}
