use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// License attribution for a package.
///
/// Either declared by the package metadata (e.g. the RPM `License` tag) or
/// detected from a license/copyright file. Two licenses are the same
/// attribution when their `(id, expression)` pair matches.
#[derive(Debug, Clone, PartialEq)]
pub struct License {
    path: Option<PathBuf>,
    id: Option<String>,
    expression: String,
    declared: bool,
    confidence: f32,
}

impl License {
    pub fn new(
        path: Option<PathBuf>,
        id: Option<String>,
        expression: String,
        declared: bool,
        confidence: f32,
    ) -> Self {
        Self {
            path,
            id,
            expression,
            declared,
            confidence,
        }
    }

    /// A license declared in package metadata. A single-token expression is
    /// also used as the identifier.
    pub fn declared(expression: &str) -> Self {
        let expression = expression.trim();
        let id = if is_single_identifier(expression) {
            Some(expression.to_string())
        } else {
            None
        };
        Self::new(None, id, expression.to_string(), true, 1.0)
    }

    /// A license found in a file by the license detector.
    pub fn detected(path: &Path, id: &str, confidence: f32) -> Self {
        Self::new(
            Some(path.to_path_buf()),
            Some(id.to_string()),
            id.to_string(),
            false,
            confidence,
        )
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

fn is_single_identifier(expression: &str) -> bool {
    !expression.is_empty()
        && !expression.contains(char::is_whitespace)
        && !expression.contains(['(', ')'])
}

/// Removes licenses repeating an earlier `(id, expression)` pair, keeping order.
pub fn dedup_licenses(licenses: Vec<License>) -> Vec<License> {
    let mut seen: HashSet<(Option<String>, String)> = HashSet::new();
    licenses
        .into_iter()
        .filter(|l| seen.insert((l.id.clone(), l.expression.clone())))
        .collect()
}
