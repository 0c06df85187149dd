//! `pod resolve`: print the resolved closure without touching the build root.

use std::collections::HashMap;
use std::path::PathBuf;

use pod_core::error::PodResult;
use pod_resolver::{Resolution, SpecificationSet};

use super::{insert_path, CommandContext, Project};

pub async fn execute(spec_repo: Option<PathBuf>, ctx: &CommandContext) -> PodResult<()> {
    let mut overrides = HashMap::new();
    insert_path(&mut overrides, "spec_repo", spec_repo.as_ref());

    let project = Project::load(ctx, overrides).await?;
    let resolution = project.resolve()?;

    for line in describe(&resolution) {
        ctx.output.info(&line);
    }
    ctx.output.success(&format!(
        "Resolved {} package(s) in {}ms",
        resolution.len(),
        resolution.resolution_time_ms
    ));
    Ok(())
}

/// One line per set in discovery order
pub fn describe(resolution: &Resolution) -> Vec<String> {
    resolution.sets().map(describe_set).collect()
}

fn describe_set(set: &SpecificationSet) -> String {
    let winner = set.winning_specification();
    let mut line = winner.to_string();

    if let Some(part_of) = winner.part_of() {
        line.push_str(&format!(" (part of {})", part_of.name));
    }
    if set.is_only_part_of_other_package() {
        line.push_str(" [source owner only]");
    }
    line
}
