use std::fmt;

/// Package-manager kind of the build environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Debian,
    Rpm,
    Unknown,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Debian => write!(f, "dpkg"),
            PackageManager::Rpm => write!(f, "rpm"),
            PackageManager::Unknown => write!(f, "unknown"),
        }
    }
}

/// OSFamily value object: package-manager kind plus distro name and release.
/// Drives the shape of generated package URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OsFamily {
    manager: PackageManager,
    distro: String,
    release: String,
}

impl OsFamily {
    pub fn new(manager: PackageManager, distro: impl Into<String>, release: impl Into<String>) -> Self {
        Self {
            manager,
            distro: distro.into(),
            release: release.into(),
        }
    }

    pub fn debian(distro: impl Into<String>, release: impl Into<String>) -> Self {
        Self::new(PackageManager::Debian, distro, release)
    }

    pub fn rpm(distro: impl Into<String>, release: impl Into<String>) -> Self {
        Self::new(PackageManager::Rpm, distro, release)
    }

    pub fn unknown() -> Self {
        Self::new(PackageManager::Unknown, "", "")
    }

    /// Reads `ID` and `VERSION_ID` from os-release(5) content.
    ///
    /// Missing keys leave the distro as `unknown` and the release empty.
    pub fn from_os_release(manager: PackageManager, content: &str) -> Self {
        let mut distro = None;
        let mut release = None;

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key.trim() {
                "ID" => distro = Some(value.to_string()),
                "VERSION_ID" => release = Some(value.to_string()),
                _ => {}
            }
        }

        Self::new(
            manager,
            distro.unwrap_or_else(|| "unknown".to_string()),
            release.unwrap_or_default(),
        )
    }

    pub fn manager(&self) -> PackageManager {
        self.manager
    }

    pub fn distro(&self) -> &str {
        &self.distro
    }

    pub fn release(&self) -> &str {
        &self.release
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_release_debian() {
        let content = r#"PRETTY_NAME="Debian GNU/Linux 12 (bookworm)"
NAME="Debian GNU/Linux"
VERSION_ID="12"
VERSION="12 (bookworm)"
ID=debian
"#;
        let family = OsFamily::from_os_release(PackageManager::Debian, content);
        assert_eq!(family.manager(), PackageManager::Debian);
        assert_eq!(family.distro(), "debian");
        assert_eq!(family.release(), "12");
    }

    #[test]
    fn test_from_os_release_single_quotes_and_comments() {
        let content = "# comment\nID='fedora'\nVERSION_ID=39\n";
        let family = OsFamily::from_os_release(PackageManager::Rpm, content);
        assert_eq!(family.distro(), "fedora");
        assert_eq!(family.release(), "39");
    }

    #[test]
    fn test_from_os_release_missing_keys() {
        let family = OsFamily::from_os_release(PackageManager::Rpm, "NAME=Something\n");
        assert_eq!(family.distro(), "unknown");
        assert_eq!(family.release(), "");
    }

    #[test]
    fn test_unknown() {
        let family = OsFamily::unknown();
        assert_eq!(family.manager(), PackageManager::Unknown);
        assert!(family.distro().is_empty());
    }
}
