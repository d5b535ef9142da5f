//! Release reconciliation against the hosting API.
//!
//! One version tag moves through lookup, create, upload and (optionally) tap
//! update. An existing release is left untouched: nothing is created and
//! nothing is uploaded. Any failing stage aborts the rest, and earlier
//! remote side effects stay in place.

use crate::build_info::BuildInfo;
use crate::error::{GorocketError, ReleaseStage, Result};
use crate::formula::formula_file_name;
use crate::github::{FileUpdate, HostError, NewRelease, Release, ReleaseAsset, ReleaseHost};
use crate::output::write_line;
use crate::repository::RemoteRepository;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use std::io::Write;

/// Directory of formula files in a tap repository.
pub const TAP_FORMULA_DIR: &str = "Formula";

/// Inputs for one release run.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseRequest<'a> {
    /// Module and version being released.
    pub info: &'a BuildInfo,
    /// Repository receiving the release.
    pub repo: &'a RemoteRepository,
    /// Directory holding the archives and formula.
    pub dist_dir: &'a Utf8Path,
    /// Create the release as a draft.
    pub draft: bool,
    /// Tap repository to receive the formula, if configured.
    pub tap: Option<&'a RemoteRepository>,
}

/// What a release run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// The release that now exists for the tag.
    pub release: Release,
    /// Whether this run created it.
    pub created: bool,
    /// Names of assets uploaded by this run.
    pub uploaded: Vec<String>,
    /// Whether the tap formula was written.
    pub tap_updated: bool,
}

/// Path of the formula inside a tap repository.
#[must_use]
pub fn tap_formula_path(module_name: &str) -> String {
    format!("{TAP_FORMULA_DIR}/{}", formula_file_name(module_name))
}

/// Lists every file in `dist_dir` except `manifest_name`, sorted by name.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be read.
pub fn collect_assets(dist_dir: &Utf8Path, manifest_name: &str) -> Result<Vec<ReleaseAsset>> {
    let mut assets = Vec::new();
    for entry in dist_dir.read_dir_utf8()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() || entry.file_name() == manifest_name {
            continue;
        }
        assets.push(ReleaseAsset {
            name: entry.file_name().to_owned(),
            path: entry.path().to_owned(),
        });
    }
    assets.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(assets)
}

fn stage_error(stage: ReleaseStage) -> impl FnOnce(HostError) -> GorocketError {
    move |source| GorocketError::Release { stage, source }
}

/// Drives one release tag through lookup, create, upload and tap update.
pub struct ReleaseReconciler<'a> {
    host: &'a dyn ReleaseHost,
}

impl<'a> ReleaseReconciler<'a> {
    /// Creates a reconciler over `host`.
    #[must_use]
    pub fn new(host: &'a dyn ReleaseHost) -> Self {
        Self { host }
    }

    /// Publishes the contents of `request.dist_dir` as the release for
    /// `request.info.version`.
    ///
    /// # Errors
    ///
    /// Returns [`GorocketError::Release`] tagged with the failing stage, or
    /// an I/O error if the output directory or formula cannot be read.
    pub fn release(
        &self,
        request: &ReleaseRequest<'_>,
        progress: &mut dyn Write,
    ) -> Result<ReleaseOutcome> {
        let version = request.info.version.as_str();
        let existing = self.lookup(request.repo, version)?;

        let (release, created, uploaded) = if let Some(release) = existing {
            write_line(progress, format!("Release {version} already exists"));
            (release, false, Vec::new())
        } else {
            let release = self
                .host
                .create_release(request.repo, &NewRelease::for_version(version, request.draft))
                .map_err(stage_error(ReleaseStage::Create))?;
            info!("created release {version} in {}", request.repo);
            write_line(progress, format!("Created release {version}"));
            let manifest = formula_file_name(&request.info.module_name);
            let assets = collect_assets(request.dist_dir, &manifest)?;
            let uploaded = self.upload_assets(&release, &assets, progress)?;
            (release, true, uploaded)
        };

        let tap_updated = match request.tap {
            Some(tap) => {
                self.update_tap(request.info, request.dist_dir, tap)?;
                write_line(
                    progress,
                    format!("Updated {tap}/{}", tap_formula_path(&request.info.module_name)),
                );
                true
            }
            None => false,
        };

        Ok(ReleaseOutcome {
            release,
            created,
            uploaded,
            tap_updated,
        })
    }

    /// Returns the existing release for `tag`; not-found is `None`.
    fn lookup(&self, repo: &RemoteRepository, tag: &str) -> Result<Option<Release>> {
        match self.host.release_by_tag(repo, tag) {
            Ok(release) => Ok(Some(release)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(stage_error(ReleaseStage::Lookup)(err)),
        }
    }

    fn upload_assets(
        &self,
        release: &Release,
        assets: &[ReleaseAsset],
        progress: &mut dyn Write,
    ) -> Result<Vec<String>> {
        let mut uploaded = Vec::with_capacity(assets.len());
        for asset in assets {
            self.host
                .upload_asset(release, asset)
                .map_err(stage_error(ReleaseStage::Upload))?;
            write_line(progress, format!("Uploaded {}", asset.name));
            uploaded.push(asset.name.clone());
        }
        Ok(uploaded)
    }

    /// Writes the generated formula into `tap`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the formula is missing from `dist_dir`, or
    /// [`GorocketError::Release`] if the tap cannot be read or written.
    pub fn update_tap(
        &self,
        info: &BuildInfo,
        dist_dir: &Utf8Path,
        tap: &RemoteRepository,
    ) -> Result<()> {
        let local: Utf8PathBuf = dist_dir.join(formula_file_name(&info.module_name));
        let content = std::fs::read(&local)?;
        let path = tap_formula_path(&info.module_name);

        let sha = match self.host.file_contents(tap, &path) {
            Ok(existing) => Some(existing.sha),
            Err(err) if err.is_not_found() => {
                warn!("{tap} has no {path} yet; creating it");
                None
            }
            Err(err) => return Err(stage_error(ReleaseStage::TapLookup)(err)),
        };

        let update = FileUpdate {
            message: format!("Update {} to {}", info.module_name, info.version),
            content,
            sha,
        };
        self.host
            .put_file(tap, &path, &update)
            .map_err(stage_error(ReleaseStage::TapUpdate))?;
        info!("updated {path} in {tap}");
        Ok(())
    }
}

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;
