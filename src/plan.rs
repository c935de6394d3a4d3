use serde::Serialize;

use crate::config::Config;
use crate::domain::Stage;
use crate::error::ResolveError;
use crate::paths::{
    adjusted_metadata_path, combined_alignment_path, combined_metadata_path, path_for,
    sanitized_metadata_path,
};

/// Whether an artifact comes straight from the single configured input or
/// from a merge across inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum ArtifactPlan {
    Passthrough(String),
    Combined(String),
}

impl ArtifactPlan {
    pub fn path(&self) -> &str {
        match self {
            ArtifactPlan::Passthrough(path) | ArtifactPlan::Combined(path) => path,
        }
    }

    pub fn into_path(self) -> String {
        match self {
            ArtifactPlan::Passthrough(path) | ArtifactPlan::Combined(path) => path,
        }
    }
}

/// Metadata every build starts from.
///
/// A single input passes through its sanitized metadata, or its raw metadata
/// when sanitizing is skipped. Any other input count needs the merged table.
pub fn unified_metadata(config: &Config) -> Result<ArtifactPlan, ResolveError> {
    let Some((name, input)) = config.single_input() else {
        return Ok(ArtifactPlan::Combined(combined_metadata_path()));
    };
    if input.skip_sanitize_metadata {
        return Ok(ArtifactPlan::Passthrough(path_for(config, Stage::Metadata, name)?));
    }
    Ok(ArtifactPlan::Passthrough(sanitized_metadata_path(name)))
}

/// Alignment that subsampling reads from.
pub fn unified_alignment(config: &Config) -> Result<ArtifactPlan, ResolveError> {
    match config.single_input() {
        Some((name, _)) => Ok(ArtifactPlan::Passthrough(path_for(config, Stage::Aligned, name)?)),
        None => Ok(ArtifactPlan::Combined(combined_alignment_path())),
    }
}

/// Metadata for a build. Regional builds read a copy with adjusted regions;
/// `global` and builds without a region use the unified metadata.
pub fn metadata_for_build(config: &Config, build_name: &str) -> Result<String, ResolveError> {
    let build = config.build(build_name)?;
    if build_name == "global" || build.region.is_none() {
        return Ok(unified_metadata(config)?.into_path());
    }
    Ok(adjusted_metadata_path(build_name))
}
