use crate::config::Config;
use crate::domain::Stage;
use crate::error::ResolveError;

pub const RESULTS_DIR: &str = "results";
pub const AUSPICE_DIR: &str = "auspice";

/// Location of `stage` for `input_name`.
///
/// A configured location, local path or remote locator, is returned as is.
/// Missing `aligned` locations are derived; `metadata` and `sequences` must
/// come from the config. The input itself must be configured.
pub fn path_for(config: &Config, stage: Stage, input_name: &str) -> Result<String, ResolveError> {
    let input = config
        .inputs
        .get(input_name)
        .ok_or_else(|| ResolveError::UnknownInput(input_name.to_string()))?;
    if let Some(location) = input.location(stage) {
        return Ok(location.to_string());
    }

    if stage.is_required() {
        return Err(ResolveError::MissingRequiredInput {
            input: input_name.to_string(),
            stage: stage.to_string(),
        });
    }
    let derived = aligned_path(input_name);
    tracing::debug!(input = input_name, %stage, path = %derived, "derived canonical path");
    Ok(derived)
}

/// Same as [`path_for`] with the stage given by name.
pub fn path_for_stage_name(
    config: &Config,
    stage: &str,
    input_name: &str,
) -> Result<String, ResolveError> {
    path_for(config, stage.parse()?, input_name)
}

pub fn aligned_path(input_name: &str) -> String {
    format!("{RESULTS_DIR}/aligned_{input_name}.fasta.xz")
}

pub fn sanitized_metadata_path(input_name: &str) -> String {
    format!("{RESULTS_DIR}/sanitized_metadata_{input_name}.tsv.xz")
}

pub fn combined_metadata_path() -> String {
    format!("{RESULTS_DIR}/combined_metadata.tsv.xz")
}

pub fn combined_alignment_path() -> String {
    format!("{RESULTS_DIR}/combined_sequences_for_subsampling.fasta.xz")
}

pub fn adjusted_metadata_path(build_name: &str) -> String {
    format!("{RESULTS_DIR}/{build_name}/metadata_adjusted.tsv.xz")
}

pub fn build_results_path(build_name: &str, file_name: &str) -> String {
    format!("{RESULTS_DIR}/{build_name}/{file_name}")
}

pub fn auspice_path(prefix: &str, build_name: &str, suffix: &str) -> String {
    format!("{AUSPICE_DIR}/{prefix}_{build_name}{suffix}.json")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> Config {
        Config::from_yaml_str(
            r#"
inputs:
  gisaid:
    metadata: s3://bucket/metadata.tsv.gz
    sequences: data/sequences.fasta
  preprocessed:
    metadata: data/pre.tsv
    sequences: data/pre.fasta
    aligned: data/pre_aligned.fasta.xz
  partial:
    metadata: data/partial.tsv
"#,
        )
        .unwrap()
    }

    #[test]
    fn configured_locations_are_verbatim() {
        let config = config();
        assert_eq!(
            path_for(&config, Stage::Metadata, "gisaid").unwrap(),
            "s3://bucket/metadata.tsv.gz"
        );
        assert_eq!(
            path_for(&config, Stage::Aligned, "preprocessed").unwrap(),
            "data/pre_aligned.fasta.xz"
        );
    }

    #[test]
    fn aligned_is_derived_when_missing() {
        let config = config();
        assert_eq!(
            path_for(&config, Stage::Aligned, "gisaid").unwrap(),
            "results/aligned_gisaid.fasta.xz"
        );
    }

    #[test]
    fn required_stage_missing_is_fatal() {
        let config = config();
        let err = path_for(&config, Stage::Sequences, "partial").unwrap_err();
        assert_matches!(
            err,
            ResolveError::MissingRequiredInput { input, stage }
                if input == "partial" && stage == "sequences"
        );
    }

    #[test]
    fn unconfigured_input_is_unknown_for_every_stage() {
        let config = config();
        for stage in [Stage::Metadata, Stage::Sequences, Stage::Aligned] {
            assert_matches!(
                path_for(&config, stage, "gisiad"),
                Err(ResolveError::UnknownInput(name)) if name == "gisiad"
            );
        }
    }

    #[test]
    fn unknown_stage_name_is_fatal() {
        let config = config();
        let err = path_for_stage_name(&config, "masked", "gisaid").unwrap_err();
        assert_matches!(err, ResolveError::UnknownStage(_));
    }
}
