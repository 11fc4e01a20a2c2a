//! ZIP archive assembly for finished tasks.

use crate::error::{Error, Result};
use crate::types::ArchiveReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipWriter;
use zip::write::FileOptions;

/// How unreadable local files are treated while building an archive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchivePolicy {
    /// Skip files that cannot be opened or read instead of failing
    pub best_effort: bool,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self { best_effort: true }
    }
}

/// Builds a flat ZIP archive from local files
pub struct ArchiveBuilder {
    policy: ArchivePolicy,
}

impl ArchiveBuilder {
    /// Create a builder with the given policy
    pub fn new(policy: ArchivePolicy) -> Self {
        Self { policy }
    }

    /// Write `files` into a new archive at `archive_path`.
    ///
    /// Each file is stored under its base name. With a best-effort policy a
    /// file that cannot be opened or read is left out and reported in
    /// [`ArchiveReport::skipped`]; failing to create or finalize the archive
    /// itself is always an error.
    ///
    /// The archive is written to `<archive_path>.part` and renamed into place
    /// only once it is complete, so a failed build leaves nothing at
    /// `archive_path`.
    pub fn build(&self, archive_path: &Path, files: &[PathBuf]) -> Result<ArchiveReport> {
        debug!(?archive_path, count = files.len(), "building ZIP archive");

        let partial = partial_path(archive_path);
        let report = match self.write_archive(&partial, files) {
            Ok(report) => report,
            Err(e) => {
                if let Err(rm) = std::fs::remove_file(&partial) {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = ?partial, error = %rm, "can't remove partial archive");
                    }
                }
                return Err(e);
            }
        };

        std::fs::rename(&partial, archive_path).map_err(|e| {
            Error::storage(archive_path, format!("can't move archive into place: {}", e))
        })?;

        info!(
            ?archive_path,
            added = report.added.len(),
            skipped = report.skipped.len(),
            "ZIP archive written"
        );
        Ok(report)
    }

    fn write_archive(&self, archive_path: &Path, files: &[PathBuf]) -> Result<ArchiveReport> {
        let out = File::create(archive_path)
            .map_err(|e| Error::storage(archive_path, format!("can't create archive: {}", e)))?;
        let mut zip = ZipWriter::new(BufWriter::new(out));
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut report = ArchiveReport::default();
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                self.tolerate(&mut report, path, "path has no file name")?;
                continue;
            };

            let contents = match std::fs::read(path) {
                Ok(contents) => contents,
                Err(e) => {
                    self.tolerate(&mut report, path, e)?;
                    continue;
                }
            };

            zip.start_file(name.as_str(), options)
                .map_err(|e| Error::storage(archive_path, format!("can't add {}: {}", name, e)))?;
            zip.write_all(&contents)
                .map_err(|e| Error::storage(archive_path, format!("can't write {}: {}", name, e)))?;
            report.added.push(name);
        }

        let mut writer = zip
            .finish()
            .map_err(|e| Error::storage(archive_path, format!("error closing archive: {}", e)))?;
        writer
            .flush()
            .map_err(|e| Error::storage(archive_path, format!("error closing archive: {}", e)))?;

        Ok(report)
    }

    fn tolerate(
        &self,
        report: &mut ArchiveReport,
        path: &Path,
        reason: impl std::fmt::Display,
    ) -> Result<()> {
        if !self.policy.best_effort {
            return Err(Error::storage(path, format!("can't read: {}", reason)));
        }
        warn!(?path, %reason, "skipping unreadable file");
        report.skipped.push(path.to_path_buf());
        Ok(())
    }
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut name = archive_path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
