//! Container formats for release archives.
//!
//! Windows targets ship as zip, everything else as gzip-compressed tar. Both
//! produce the same layout: one directory holding one binary.

use super::ArchiveError;
use super::naming::ArchiveName;
use crate::target::ConcreteTarget;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::time::UNIX_EPOCH;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Permission bits recorded for the binary in tar archives.
pub const TAR_ENTRY_MODE: u32 = 0o755;

/// Archive container selected by target OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar stream.
    TarGz,
    /// Zip with a single deflated entry.
    Zip,
}

impl ArchiveFormat {
    /// Chooses the format for `target`.
    #[must_use]
    pub fn for_target(target: &ConcreteTarget) -> Self {
        if target.is_windows() {
            Self::Zip
        } else {
            Self::TarGz
        }
    }

    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Packs `binary` into `{output_dir}/{name.file_name()}` and returns the
    /// archive path.
    ///
    /// A failed write may leave a partial archive on disk.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] naming the step that failed.
    pub fn package(
        self,
        binary: &Utf8Path,
        name: &ArchiveName,
        output_dir: &Utf8Path,
    ) -> Result<Utf8PathBuf, ArchiveError> {
        let archive_path = output_dir.join(name.file_name());
        let entry = name.entry_path();
        match self {
            Self::TarGz => write_tar_gz(binary, &entry, &archive_path)?,
            Self::Zip => write_zip(binary, &entry, &archive_path)?,
        }
        Ok(archive_path)
    }
}

fn create_archive_file(path: &Utf8Path) -> Result<File, ArchiveError> {
    File::create(path).map_err(|source| ArchiveError::CreateArchive {
        path: path.to_owned(),
        source,
    })
}

fn open_binary(path: &Utf8Path) -> Result<File, ArchiveError> {
    File::open(path).map_err(|source| ArchiveError::OpenSource {
        path: path.to_owned(),
        source,
    })
}

fn finish_error(path: &Utf8Path, reason: impl ToString) -> ArchiveError {
    ArchiveError::Finish {
        path: path.to_owned(),
        reason: reason.to_string(),
    }
}

fn write_tar_gz(
    binary: &Utf8Path,
    entry: &str,
    archive_path: &Utf8Path,
) -> Result<(), ArchiveError> {
    let archive_file = create_archive_file(archive_path)?;
    let mut source = open_binary(binary)?;
    let metadata = source
        .metadata()
        .map_err(|err| ArchiveError::StatSource {
            path: binary.to_owned(),
            source: err,
        })?;

    let mut header = tar::Header::new_gnu();
    header
        .set_path(entry)
        .map_err(|err| ArchiveError::TarHeader { source: err })?;
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(metadata.len());
    header.set_mode(TAR_ENTRY_MODE);
    header.set_mtime(modified_secs(&metadata));
    header.set_cksum();

    let mut builder = tar::Builder::new(GzEncoder::new(archive_file, Compression::default()));
    builder
        .append(&header, &mut source)
        .map_err(|err| ArchiveError::TarContent { source: err })?;
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|err| finish_error(archive_path, err))?;
    Ok(())
}

fn write_zip(binary: &Utf8Path, entry: &str, archive_path: &Utf8Path) -> Result<(), ArchiveError> {
    let archive_file = create_archive_file(archive_path)?;
    let mut source = open_binary(binary)?;

    let mut writer = zip::ZipWriter::new(archive_file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer
        .start_file(entry, options)
        .map_err(|err| ArchiveError::ZipEntry { source: err })?;
    io::copy(&mut source, &mut writer).map_err(|err| ArchiveError::ZipContent { source: err })?;
    writer
        .finish()
        .map_err(|err| finish_error(archive_path, err))?;
    Ok(())
}

fn modified_secs(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_secs())
}
