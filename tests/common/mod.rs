//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A directory that looks like an installed React Native project.
pub struct RnProject {
    pub dir: TempDir,
}

impl RnProject {
    pub fn new(version: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let rn = dir.path().join("node_modules/react-native");
        fs::create_dir_all(&rn).unwrap();
        fs::write(
            rn.join("package.json"),
            format!(r#"{{"name":"react-native","version":"{}"}}"#, version),
        )
        .unwrap();
        fs::write(dir.path().join("index.js"), "console.log('app');").unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Entries of the project root whose names start with `prefix`.
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<String> {
        fs::read_dir(self.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(prefix))
            .collect()
    }
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// Stand-in for `react-native bundle`: writes the bundle, one asset and,
/// when asked, a sourcemap carrying a debug id.
pub const FAKE_BUNDLER: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --bundle-output) out="$2"; shift ;;
    --sourcemap-output) map="$2"; shift ;;
    --assets-dest) assets="$2"; shift ;;
  esac
  shift
done
mkdir -p "$assets/drawable-mdpi"
printf 'console.log("bundle")' > "$out"
printf 'png' > "$assets/drawable-mdpi/logo.png"
if [ -n "$map" ]; then
  printf '{"version":3,"mappings":"","debugId":"dbg-1"}' > "$map"
fi
echo "bundle written"
"#;

/// Stand-in for hermesc: `-emit-binary -out <out> <in> [-output-source-map]`.
pub const FAKE_HERMESC: &str = r#"
out="$3"
printf 'HBC' > "$out"
for arg in "$@"; do
  if [ "$arg" = "-output-source-map" ]; then
    printf '{"version":3,"mappings":"AAAA"}' > "$out.map"
  fi
done
echo "warning: unused variable" 1>&2
"#;

/// A bundler that always fails.
pub const FAILING_BUNDLER: &str = "echo 'Unable to resolve module' 1>&2\nexit 1\n";
