//! bundle::project
//!
//! React Native project detection and input validation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use semver::Version;
use serde::Deserialize;

use super::BundleError;

/// Manifest probed while walking up from the working directory.
const RN_MANIFEST: &str = "node_modules/react-native/package.json";

/// Target platform of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Lowercase name used on the wire and in paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// File name the bundler writes for this platform.
    pub fn bundle_name(self) -> &'static str {
        match self {
            Platform::Android => "index.android.bundle",
            Platform::Ios => "main.jsbundle",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = BundleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            _ => Err(BundleError::InvalidPlatform(value.to_string())),
        }
    }
}

/// Check a platform name, case-insensitively.
pub fn is_valid_platform(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.parse::<Platform>().is_ok())
}

/// A detected React Native project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactNativeProject {
    /// Directory holding `node_modules`.
    pub root: PathBuf,
    /// Version string from the `react-native` manifest.
    pub version: String,
}

#[derive(Deserialize)]
struct PackageManifest {
    version: Option<String>,
}

impl ReactNativeProject {
    /// Walk upward from `start` looking for an installed `react-native` package.
    pub fn find(start: &Path) -> Option<Self> {
        start.ancestors().find_map(|dir| {
            let manifest = dir.join(RN_MANIFEST);
            let content = fs::read_to_string(&manifest).ok()?;
            let parsed: PackageManifest = match serde_json::from_str(&content) {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::debug!("ignoring unreadable {}: {}", manifest.display(), e);
                    return None;
                }
            };
            let version = parsed.version.filter(|v| !v.trim().is_empty())?;
            Some(Self {
                root: dir.to_path_buf(),
                version,
            })
        })
    }

    /// Like [`find`](Self::find), failing with [`BundleError::NoProject`].
    pub fn require(start: &Path) -> Result<Self, BundleError> {
        Self::find(start).ok_or(BundleError::NoProject)
    }

    /// `node_modules` of the project.
    pub fn node_modules(&self) -> PathBuf {
        self.root.join("node_modules")
    }

    /// Installed `react-native` package directory.
    pub fn package_dir(&self) -> PathBuf {
        self.node_modules().join("react-native")
    }

    /// Version coerced to semver (`0.74.0-rc.1` and `0.74` both work).
    pub fn semver(&self) -> Option<Version> {
        coerce_version(&self.version)
    }
}

/// Extract the first `major[.minor[.patch]]` run from a version string.
pub fn coerce_version(raw: &str) -> Option<Version> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let numeric: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric.split('.').filter(|p| !p.is_empty()).map(str::parse::<u64>);
    let major = parts.next()?.ok()?;
    let minor = parts.next().and_then(Result::ok).unwrap_or(0);
    let patch = parts.next().and_then(Result::ok).unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Resolve and check the entry file.
///
/// Without an explicit value the bundler default `index.js` is used
/// unchecked. An explicit value must name an existing regular file
/// (relative paths are taken from `cwd`).
pub fn resolve_entry_file(cwd: &Path, entry: Option<&str>) -> Result<String, BundleError> {
    match entry {
        None => Ok("index.js".to_string()),
        Some(entry) => {
            let path = cwd.join(entry);
            if path.is_file() {
                Ok(entry.to_string())
            } else {
                Err(BundleError::EntryFileMissing(entry.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_rn_manifest(root: &Path, version: &str) {
        let dir = root.join("node_modules/react-native");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            format!(r#"{{"name":"react-native","version":"{}"}}"#, version),
        )
        .unwrap();
    }

    #[test]
    fn platform_names_are_case_insensitive() {
        assert!(is_valid_platform(Some("Android")));
        assert!(is_valid_platform(Some("IOS")));
        assert!(is_valid_platform(Some("ios")));
        assert!(!is_valid_platform(Some("windows")));
        assert!(!is_valid_platform(Some("")));
        assert!(!is_valid_platform(None));
    }

    #[test]
    fn bundle_names_per_platform() {
        assert_eq!(Platform::Ios.bundle_name(), "main.jsbundle");
        assert_eq!(Platform::Android.bundle_name(), "index.android.bundle");
        assert_eq!("ANDROID".parse::<Platform>().unwrap(), Platform::Android);
    }

    #[test]
    fn project_is_found_from_nested_directory() {
        let dir = TempDir::new().unwrap();
        write_rn_manifest(dir.path(), "0.74.1");
        let nested = dir.path().join("src/screens");
        fs::create_dir_all(&nested).unwrap();

        let project = ReactNativeProject::find(&nested).expect("project");
        assert_eq!(project.root, dir.path());
        assert_eq!(project.version, "0.74.1");
        assert_eq!(project.package_dir(), dir.path().join("node_modules/react-native"));
    }

    #[test]
    fn missing_project_is_no_project() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ReactNativeProject::require(dir.path()),
            Err(BundleError::NoProject)
        ));
    }

    #[test]
    fn versions_are_coerced() {
        assert_eq!(coerce_version("0.74.0-rc.1"), Some(Version::new(0, 74, 0)));
        assert_eq!(coerce_version("^0.62"), Some(Version::new(0, 62, 0)));
        assert_eq!(coerce_version("next"), None);
    }

    #[test]
    fn default_entry_file_is_index() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_entry_file(dir.path(), None).unwrap(), "index.js");
    }

    #[test]
    fn explicit_entry_file_must_be_a_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("app.js"), "").unwrap();

        assert_eq!(resolve_entry_file(dir.path(), Some("app.js")).unwrap(), "app.js");
        assert!(matches!(
            resolve_entry_file(dir.path(), Some("src")),
            Err(BundleError::EntryFileMissing(_))
        ));
        assert!(matches!(
            resolve_entry_file(dir.path(), Some("missing.js")),
            Err(BundleError::EntryFileMissing(_))
        ));
    }
}
