//! `pod spec <FILE>`: parse and validate one package definition.

use std::path::PathBuf;

use pod_config::parse_package_definition;
use pod_core::error::PodResult;
use pod_core::types::Specification;

use super::CommandContext;

pub async fn execute(file: PathBuf, ctx: &CommandContext) -> PodResult<Specification> {
    let path = ctx.cwd.join(file);
    let spec = parse_package_definition(&path)?;

    ctx.output.success(&format!("{} is valid", path.display()));
    ctx.output.info(&spec.to_string());
    if let Some(summary) = spec.summary() {
        ctx.output.detail(summary);
    }
    if let Some(source) = spec.source() {
        ctx.output.detail(&format!("source: {}", source));
    }
    if let Some(part_of) = spec.part_of() {
        ctx.output.detail(&format!("part of: {} ({})", part_of.name, part_of.requirement_string()));
    }
    for dependency in spec.dependencies().iter().filter(|dep| !dep.is_part_of()) {
        ctx.output.detail(&format!("depends on: {}", dependency));
    }
    Ok(spec)
}
