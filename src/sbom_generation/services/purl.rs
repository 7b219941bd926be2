use crate::sbom_generation::domain::{Package, PackageManager};

/// Builds the package URL for a package, shaped by its OS family.
///
/// - Debian: `pkg:deb/debian/<name>@<version>?arch=<arch>&distro=<distro>-<release>`
/// - RPM: `pkg:rpm/<distro>/<name>@<version>?arch=<arch>&distro=<distro>-<release>`
/// - source pseudo-packages and unknown families: `pkg:generic/<name>@<version>`
pub fn package_url(package: &Package) -> String {
    let family = package.os_family();
    if package.is_source() {
        return generic_purl(package.name(), package.version());
    }

    let namespace = match family.manager() {
        PackageManager::Debian => "deb/debian".to_string(),
        PackageManager::Rpm => format!("rpm/{}", encode(family.distro())),
        PackageManager::Unknown => return generic_purl(package.name(), package.version()),
    };

    let mut qualifiers = Vec::new();
    if !package.architecture().is_empty() {
        qualifiers.push(format!("arch={}", encode(package.architecture())));
    }
    if !family.release().is_empty() {
        qualifiers.push(format!(
            "distro={}",
            encode(&format!("{}-{}", family.distro(), family.release()))
        ));
    }

    let mut purl = format!(
        "pkg:{}/{}@{}",
        namespace,
        encode(package.name()),
        encode(package.version())
    );
    if !qualifiers.is_empty() {
        purl.push('?');
        purl.push_str(&qualifiers.join("&"));
    }
    purl
}

pub fn generic_purl(name: &str, version: &str) -> String {
    if version.is_empty() {
        format!("pkg:generic/{}", encode(name))
    } else {
        format!("pkg:generic/{}@{}", encode(name), encode(version))
    }
}

/// Percent-encodes a purl segment. `:` needs no encoding in a purl and
/// is left readable for Debian epochs; `+` stays `%2B` since query-style
/// decoders read a bare `+` as a space.
fn encode(segment: &str) -> String {
    urlencoding::encode(segment).replace("%3A", ":")
}
