//! Parsing helpers for dpkg control data (the `status` database format).

use crate::sbom_generation::domain::SourcePackage;
use std::collections::{HashMap, HashSet};

/// One paragraph of a control file: field name -> value.
/// Continuation lines are joined to their field with `\n`.
pub(crate) type Stanza = HashMap<String, String>;

/// Splits control-file content into stanzas separated by blank lines
pub(crate) fn parse_stanzas(content: &str) -> Vec<Stanza> {
    let mut stanzas = Vec::new();
    let mut current = Stanza::new();
    let mut last_field: Option<String> = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
            last_field = None;
            continue;
        }

        if line.starts_with([' ', '\t']) {
            if let Some(value) = last_field.as_ref().and_then(|f| current.get_mut(f)) {
                value.push('\n');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((field, value)) = line.split_once(':') {
            let field = field.trim().to_string();
            current.insert(field.clone(), value.trim().to_string());
            last_field = Some(field);
        }
    }

    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}

/// Extracts bare package names from a relationship field such as `Depends`.
///
/// `,` separates groups and `|` separates alternatives; version constraints,
/// architecture qualifiers and restriction lists are discarded. Every
/// alternative is kept: choosing the one that satisfied the install is not
/// attempted here.
pub(crate) fn parse_dependency_names(field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    field
        .split(',')
        .flat_map(|group| group.split('|'))
        .filter_map(|alternative| {
            let name = alternative
                .split(|c: char| c.is_whitespace() || c == '(' || c == '[' || c == '<')
                .find(|token| !token.is_empty())?;
            let name = name.split(':').next().unwrap_or(name);
            (!name.is_empty()).then(|| name.to_string())
        })
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Determines the upstream source of a binary package from its `Source` field.
///
/// `Source: foo (1.2-3)` names the version explicitly. Without a version the
/// binary's own version is used, reduced to its upstream numeric core.
pub(crate) fn parse_source(field: &str, package_version: &str) -> Option<SourcePackage> {
    let field = field.trim();
    let (name, version) = match field.split_once('(') {
        Some((name, rest)) => {
            let version = rest.trim_end().trim_end_matches(')').trim();
            (name.trim(), version.to_string())
        }
        None => (field, upstream_core(package_version)),
    };

    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some(SourcePackage::new(name, version))
}

/// `1:1.2.13.dfsg-1+deb12u1` -> `1.2.13`
fn upstream_core(version: &str) -> String {
    let without_epoch = version.split_once(':').map_or(version, |(_, rest)| rest);
    let upstream = without_epoch
        .rsplit_once('-')
        .map_or(without_epoch, |(upstream, _revision)| upstream);

    let core: String = upstream
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let core = core.trim_end_matches('.');

    if core.is_empty() {
        upstream.to_string()
    } else {
        core.to_string()
    }
}

/// A `Status` field marks an installed package when its last word is `installed`.
/// Stanzas without the field (plain control files) count as installed.
pub(crate) fn is_installed(stanza: &Stanza) -> bool {
    stanza
        .get("Status")
        .map_or(true, |status| {
            status.split_whitespace().last() == Some("installed")
        })
}
