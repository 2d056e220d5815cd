//! bundle::archive
//!
//! Zip archive of the bundle directory.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::BundleError;

/// Directory prefix of every archive entry.
pub const ENTRY_PREFIX: &str = "build";

/// Zip `source` into `destination` under [`ENTRY_PREFIX`].
///
/// A partially written archive is removed on failure.
pub fn create_archive(source: &Path, destination: &Path) -> Result<(), BundleError> {
    let result = write_archive(source, destination);
    if result.is_err() {
        let _ = fs::remove_file(destination);
    }
    result
}

fn write_archive(source: &Path, destination: &Path) -> Result<(), BundleError> {
    if !source.is_dir() {
        return Err(BundleError::Archive(format!(
            "{} is not a directory",
            source.display()
        )));
    }
    let file = File::create(destination).map_err(|e| {
        BundleError::io(format!("failed to create {}", destination.display()), e)
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name();
    let mut files = 0usize;
    for entry in walker {
        let entry = entry.map_err(|e| BundleError::Archive(e.to_string()))?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let mut name = String::from(ENTRY_PREFIX);
        for component in relative.components() {
            name.push('/');
            name.push_str(&component.as_os_str().to_string_lossy());
        }

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| BundleError::Archive(e.to_string()))?;
        } else {
            zip.start_file(name, options)
                .map_err(|e| BundleError::Archive(e.to_string()))?;
            let mut input = File::open(entry.path()).map_err(|e| {
                BundleError::io(format!("failed to read {}", entry.path().display()), e)
            })?;
            io::copy(&mut input, &mut zip).map_err(|e| BundleError::Archive(e.to_string()))?;
            files += 1;
        }
    }

    zip.finish()
        .map_err(|e| BundleError::Archive(e.to_string()))?;
    log::debug!("archived {} files into {}", files, destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn entries_are_prefixed_with_build() {
        let dir = TempDir::new().unwrap();
        let bundles = dir.path().join("bundles");
        fs::create_dir_all(bundles.join("assets")).unwrap();
        fs::write(bundles.join("main.jsbundle"), "js").unwrap();
        fs::write(bundles.join("assets/logo.png"), "png").unwrap();
        let zip_path = dir.path().join("build.zip");

        create_archive(&bundles, &zip_path).unwrap();

        let mut archive = ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_owned).collect();
        assert!(names.contains(&"build/main.jsbundle".to_string()));
        assert!(names.contains(&"build/assets/logo.png".to_string()));

        let mut content = String::new();
        archive
            .by_name("build/main.jsbundle")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "js");
    }

    #[test]
    fn failure_leaves_no_partial_archive() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("build.zip");
        assert!(create_archive(&dir.path().join("missing"), &zip_path).is_err());
        assert!(!zip_path.exists());
    }
}
