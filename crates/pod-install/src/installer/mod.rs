//! Build-tree installation
//!
//! Takes a finished `Resolution` and lays out the build root: one destination
//! directory per owning package, copies of the winning definition files, the
//! merged build configuration and whatever the project writer produces.
//!
//! Destinations are planned first and deduplicated by owner, then fetched on a
//! bounded pool. Everything after fetching runs sequentially in discovery
//! order so the generated files are deterministic.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use pod_config::InstallSettings;
use pod_core::error::PodError;
use pod_core::types::Specification;
use pod_resolver::Resolution;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::build_config::{BuildSettings, XCCONFIG_FILE};
use crate::download::{Downloader, FetchError};
use crate::marker::{inspect_destination, CompletionMarker, DestinationState};
use crate::project::ProjectWriter;
use crate::sources::{collect_source_files, SourceFileList};
use crate::InstallResult;

/// Installs resolved packages into a build root
pub struct Installer {
    build_root: PathBuf,
    clean: bool,
    jobs: usize,
    downloader: Arc<dyn Downloader>,
    writer: Arc<dyn ProjectWriter>,
}

/// Counters describing one installation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// Sets installed on their own
    pub packages_installed: usize,
    /// Sets only referenced as the owner of other packages
    pub skipped_part_of: usize,
    /// Destinations fetched from scratch
    pub downloads: usize,
    /// Destinations whose completion marker was current
    pub already_present: usize,
    /// Partial or stale destinations removed and fetched again
    pub refetched: usize,
    pub source_files: usize,
    pub definitions_copied: usize,
    /// Installation time in milliseconds
    pub install_time_ms: u64,
}

impl InstallSummary {
    /// Number of fetches performed
    pub fn fetches(&self) -> usize {
        self.downloads + self.refetched
    }
}

/// One installable specification and where its source lives
#[derive(Debug, Clone)]
struct PlannedPackage {
    spec: Arc<Specification>,
    owner: Arc<Specification>,
    destination: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    AlreadyPresent,
    Fetched,
    Refetched,
}

impl Installer {
    pub fn new(settings: &InstallSettings, downloader: Arc<dyn Downloader>, writer: Arc<dyn ProjectWriter>) -> Self {
        Self {
            build_root: settings.build_root.clone().into_std_path_buf(),
            clean: settings.clean,
            jobs: settings.jobs.max(1),
            downloader,
            writer,
        }
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Install every set of `resolution` into the build root.
    ///
    /// A failed fetch aborts before any definition, source list or build
    /// configuration is written. Destinations fetched successfully keep their
    /// completion marker and are skipped on the next run.
    pub fn install(&self, resolution: &Resolution) -> InstallResult<InstallSummary> {
        let start_time = Instant::now();
        let mut summary = InstallSummary::default();

        fs::create_dir_all(&self.build_root)
            .map_err(|e| PodError::io("Failed to create build root", &self.build_root, e))?;

        let plan = self.plan(resolution)?;
        summary.packages_installed = plan.len();
        summary.skipped_part_of = resolution.len() - plan.len();
        info!(
            "Installing {} package(s) into {}",
            plan.len(),
            self.build_root.display()
        );

        for outcome in self.fetch_all(&plan)? {
            match outcome {
                FetchOutcome::AlreadyPresent => summary.already_present += 1,
                FetchOutcome::Fetched => summary.downloads += 1,
                FetchOutcome::Refetched => summary.refetched += 1,
            }
        }

        let mut sources = SourceFileList::new();
        let mut build_settings = BuildSettings::new();
        for package in &plan {
            self.copy_definition(&package.spec)?;
            summary.definitions_copied += 1;

            let files = collect_source_files(&package.spec, &package.destination, &self.build_root)?;
            sources.extend(files);
            build_settings.merge(package.spec.build_config());
        }
        summary.source_files = sources.len();

        self.writer.create_project(&sources.to_vec(), &self.build_root)?;
        build_settings.write(&self.build_root.join(XCCONFIG_FILE))?;

        summary.install_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Installed {} package(s), {} fetched, {} already present in {}ms",
            summary.packages_installed,
            summary.fetches(),
            summary.already_present,
            summary.install_time_ms
        );
        Ok(summary)
    }

    /// Installable sets in discovery order, each paired with its owner's destination
    fn plan(&self, resolution: &Resolution) -> InstallResult<Vec<PlannedPackage>> {
        let mut plan = Vec::new();

        for set in resolution.sets() {
            if set.is_only_part_of_other_package() {
                debug!("Skipping {}, only referenced as an owner", set.name());
                continue;
            }

            let spec = Arc::clone(set.winning_specification());
            let owner = spec.resolve_owning_specification(resolution)?;
            let dir_name = owner.destination_dir_name().ok_or_else(|| {
                PodError::parse(
                    owner.defined_in_file().unwrap_or_else(|| Path::new("")),
                    "owning package has no name and version",
                )
            })?;

            plan.push(PlannedPackage {
                spec,
                owner,
                destination: self.build_root.join(dir_name),
            });
        }

        Ok(plan)
    }

    /// Fetch each distinct destination once; results follow plan order
    fn fetch_all(&self, plan: &[PlannedPackage]) -> InstallResult<Vec<FetchOutcome>> {
        let mut destinations: IndexMap<&Path, &Arc<Specification>> = IndexMap::new();
        for package in plan {
            destinations
                .entry(package.destination.as_path())
                .or_insert(&package.owner);
        }
        let destinations: Vec<(&Path, &Arc<Specification>)> = destinations.into_iter().collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| PodError::ConfigValidation {
                field: "jobs".to_string(),
                reason: e.to_string(),
            })?;

        let results: Vec<InstallResult<FetchOutcome>> = pool.install(|| {
            destinations
                .par_iter()
                .map(|(destination, owner)| self.ensure_fetched(owner, destination))
                .collect()
        });

        results.into_iter().collect()
    }

    fn ensure_fetched(&self, owner: &Specification, destination: &Path) -> InstallResult<FetchOutcome> {
        let outcome = match inspect_destination(destination, owner) {
            DestinationState::Complete => {
                info!("{} already present at {}", owner, destination.display());
                return Ok(FetchOutcome::AlreadyPresent);
            }
            DestinationState::Missing => FetchOutcome::Fetched,
            state => {
                warn!(
                    "Removing {:?} destination {} before fetching {}",
                    state,
                    destination.display(),
                    owner
                );
                fs::remove_dir_all(destination)
                    .map_err(|e| PodError::io("Failed to remove incomplete download", destination, e))?;
                FetchOutcome::Refetched
            }
        };

        let Some(source) = owner.source() else {
            return Err(download_error(owner, destination, "no source declared", None));
        };

        info!("Fetching {} from {}", owner, source);
        let fetched = self.downloader.fetch(source, destination).and_then(|()| {
            if self.clean {
                self.downloader.clean(destination)
            } else {
                Ok(())
            }
        });

        if let Err(e) = fetched {
            discard_partial(destination);
            return Err(download_error(owner, destination, e.to_string(), Some(e)));
        }

        fs::create_dir_all(destination)
            .map_err(|e| PodError::io("Failed to create destination", destination, e))?;
        CompletionMarker::for_specification(owner).write(destination)?;
        Ok(outcome)
    }

    /// Copy `spec`'s definition file into the build root
    fn copy_definition(&self, spec: &Specification) -> InstallResult<()> {
        let source = spec.defined_in_file().ok_or_else(|| PodError::ConfigValidation {
            field: "defined_in_file".to_string(),
            reason: format!("{} was not loaded from a definition file", spec),
        })?;
        let file_name = source.file_name().ok_or_else(|| {
            PodError::parse(source, "definition path has no file name")
        })?;

        let target = self.build_root.join(file_name);
        fs::copy(source, &target).map_err(|e| PodError::io("Failed to copy definition file", source, e))?;
        debug!("Copied {} to {}", source.display(), target.display());
        Ok(())
    }
}

fn download_error(
    owner: &Specification,
    destination: &Path,
    message: impl Into<String>,
    source: Option<FetchError>,
) -> PodError {
    let (package, version) = owner
        .identity()
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .unwrap_or_default();

    PodError::Download {
        package,
        version,
        destination: destination.to_path_buf(),
        message: message.into(),
        source,
    }
}

fn discard_partial(destination: &Path) {
    if !destination.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(destination) {
        warn!("Failed to remove partial download {}: {}", destination.display(), e);
    }
}

#[cfg(test)]
mod tests;
