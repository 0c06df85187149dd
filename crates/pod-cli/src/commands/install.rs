//! `pod install`: resolve pod.toml and lay out the build root.

use std::collections::HashMap;
use std::sync::Arc;

use pod_core::error::PodResult;
use pod_install::{InstallSummary, Installer, LocalDownloader, SourceListWriter, XCCONFIG_FILE};

use super::{insert_path, CommandContext, Project};
use crate::InstallArgs;

pub async fn execute(args: InstallArgs, ctx: &CommandContext) -> PodResult<InstallSummary> {
    let project = Project::load(ctx, overrides(&args)).await?;
    let settings = &project.config.settings;

    ctx.output.step("Resolving dependencies");
    let resolution = project.resolve()?;
    ctx.output.detail(&format!(
        "{} package(s) in {}ms",
        resolution.len(),
        resolution.resolution_time_ms
    ));

    ctx.output.step(&format!("Installing into {}", settings.build_root));
    let installer = Installer::new(
        settings,
        Arc::new(LocalDownloader::new()),
        Arc::new(SourceListWriter::new()),
    );
    let summary = installer.install(&resolution)?;

    report(&summary, ctx);
    ctx.output.success(&format!(
        "Installed {} package(s); build settings in {}",
        summary.packages_installed,
        settings.build_root.join(XCCONFIG_FILE)
    ));
    Ok(summary)
}

/// CLI flags as settings overrides
pub fn overrides(args: &InstallArgs) -> HashMap<String, String> {
    let mut overrides = HashMap::new();
    if args.clean {
        overrides.insert("clean".to_string(), "true".to_string());
    }
    if let Some(jobs) = args.jobs {
        overrides.insert("jobs".to_string(), jobs.to_string());
    }
    insert_path(&mut overrides, "build_root", args.build_root.as_ref());
    insert_path(&mut overrides, "spec_repo", args.spec_repo.as_ref());
    overrides
}

fn report(summary: &InstallSummary, ctx: &CommandContext) {
    ctx.output.detail(&format!("{} downloaded", summary.downloads));
    if summary.already_present > 0 {
        ctx.output.detail(&format!("{} already present", summary.already_present));
    }
    if summary.refetched > 0 {
        ctx.output.warn(&format!(
            "{} incomplete or outdated download(s) fetched again",
            summary.refetched
        ));
    }
    if summary.skipped_part_of > 0 {
        ctx.output.detail(&format!(
            "{} package(s) installed only as part of another",
            summary.skipped_part_of
        ));
    }
    ctx.output.detail(&format!("{} source file(s)", summary.source_files));
}
