//! SHA-256 checksums for release archives.

use camino::Utf8Path;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};

/// Lowercase hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the SHA-256 digest of everything `reader` yields.
///
/// # Errors
///
/// Returns any I/O error raised while reading.
pub fn digest_reader(mut reader: impl Read) -> io::Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(Sha256Digest::from_hasher(hasher))
}

/// Compute the SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use gorocket::artefact::checksum::compute_sha256;
///
/// let digest = compute_sha256(Utf8Path::new("dist/rocket_v1.0.0_linux_amd64.tar.gz"))?;
/// assert_eq!(digest.as_str().len(), 64);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn compute_sha256(path: &Utf8Path) -> io::Result<Sha256Digest> {
    digest_reader(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn empty_input_has_well_known_digest() {
        let digest = digest_reader(io::empty()).expect("digest");
        assert_eq!(digest.as_str(), EMPTY_SHA256);
    }

    #[test]
    fn known_content_digest() {
        let digest = digest_reader(&b"hello world"[..]).expect("digest");
        assert_eq!(
            digest.to_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_digest_is_deterministic() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
        let path = root.join("archive.tar.gz");
        std::fs::write(&path, vec![7u8; 20_000]).expect("write");

        let first = compute_sha256(&path).expect("first digest");
        let second = compute_sha256(&path).expect("second digest");

        assert_eq!(first, second);
        assert_eq!(first.into_inner().len(), 64);
    }

    #[test]
    fn file_larger_than_copy_buffer_matches_known_digest() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("utf8");
        let path = root.join("large.tar.gz");
        std::fs::write(&path, vec![7u8; 100_000]).expect("write");

        let digest = compute_sha256(&path).expect("digest");

        assert_eq!(
            digest.as_str(),
            "2c4b101169bf328cd4a882e640a8b57eb3acf76518b3d105869905cf629e791c"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = compute_sha256(Utf8Path::new("/nonexistent/archive.zip")).expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
