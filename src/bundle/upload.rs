//! bundle::upload
//!
//! Upload of the finished archive through a pre-signed URL.

use std::fs::{self, File};
use std::path::Path;

use zip::ZipArchive;

use super::manifest::hash_file;
use super::project::Platform;
use super::BundleError;
use crate::api::types::SignedUrlRequest;
use crate::api::{ApiClient, ApiError};

/// Content type of the upload.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Step name of the signed URL request.
pub const SIGNED_URL_STAGE: &str = "signed url request";

/// Step name of the archive PUT.
pub const PUT_STAGE: &str = "bundle upload";

const SIGNATURE_MISMATCH: &str = "SignatureDoesNotMatch";

/// SHA-256 of a zip archive.
///
/// The file must exist and parse as a zip; the extension is not consulted.
pub fn hash_archive(path: &Path) -> Result<String, BundleError> {
    let file = File::open(path).map_err(|_| BundleError::InvalidArchive)?;
    ZipArchive::new(file).map_err(|_| BundleError::InvalidArchive)?;
    hash_file(path).map_err(|e| BundleError::io(format!("failed to hash {}", path.display()), e))
}

/// Inputs of one upload.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub archive: &'a Path,
    pub upload_path: &'a str,
    pub platform: Platform,
    pub release_note: &'a str,
}

/// Request a signed URL and PUT the archive to it.
///
/// Returns the archive hash.
pub async fn upload(api: &ApiClient, request: &UploadRequest<'_>) -> Result<String, BundleError> {
    let hash = hash_archive(request.archive)?;

    let body = SignedUrlRequest {
        hash: hash.clone(),
        upload_path: request.upload_path.to_lowercase(),
        platform: request.platform.as_str().to_string(),
        release_note: request.release_note.to_string(),
    };
    let response = api
        .request_signed_url(&body)
        .await
        .map_err(|source| BundleError::Upload {
            stage: SIGNED_URL_STAGE,
            source,
        })?;
    let url = response.url().ok_or(BundleError::InvalidSignedUrl)?;

    let bytes = fs::read(request.archive).map_err(|e| {
        BundleError::io(format!("failed to read {}", request.archive.display()), e)
    })?;
    log::debug!("uploading {} bytes", bytes.len());

    api.put_bytes(url, bytes, ARCHIVE_CONTENT_TYPE)
        .await
        .map_err(classify_upload_error)?;
    Ok(hash)
}

fn classify_upload_error(error: ApiError) -> BundleError {
    if error.to_string().contains(SIGNATURE_MISMATCH) {
        BundleError::SignatureMismatch
    } else {
        BundleError::Upload {
            stage: PUT_STAGE,
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn write_zip(path: &Path) {
        let dir = path.parent().unwrap().join("content");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("main.jsbundle"), "js").unwrap();
        super::super::archive::create_archive(&dir, path).unwrap();
    }

    #[test]
    fn hash_is_sha256_of_archive_bytes() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("build.zip");
        write_zip(&zip_path);

        let expected = hex::encode(Sha256::digest(fs::read(&zip_path).unwrap()));
        assert_eq!(hash_archive(&zip_path).unwrap(), expected);
    }

    #[test]
    fn non_zip_content_is_rejected_despite_extension() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("build.zip");
        fs::write(&fake, "plain text").unwrap();

        assert!(matches!(hash_archive(&fake), Err(BundleError::InvalidArchive)));
        assert!(matches!(
            hash_archive(&dir.path().join("absent.zip")),
            Err(BundleError::InvalidArchive)
        ));
    }

    #[test]
    fn signature_mismatch_is_recognised() {
        let err = classify_upload_error(ApiError::from_response(
            403,
            "<Error><Code>SignatureDoesNotMatch</Code></Error>",
        ));
        assert!(matches!(err, BundleError::SignatureMismatch));

        let err = classify_upload_error(ApiError::from_response(500, "boom"));
        assert!(matches!(err, BundleError::Upload { stage: PUT_STAGE, .. }));
        assert_eq!(err.to_string(), "bundle upload failed: API Error: 500 - boom");
    }
}
