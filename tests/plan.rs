use assert_matches::assert_matches;

use ncov_resolve::config::Config;
use ncov_resolve::domain::Stage;
use ncov_resolve::error::ResolveError;
use ncov_resolve::paths::{path_for, path_for_stage_name};
use ncov_resolve::plan::{ArtifactPlan, metadata_for_build, unified_alignment, unified_metadata};

fn single_input() -> Config {
    Config::from_yaml_str(
        r#"
inputs:
  A:
    metadata: data/a_metadata.tsv
    sequences: data/a_sequences.fasta
builds:
  global: {}
  europe_6m:
    region: Europe
  custom_build: {}
"#,
    )
    .unwrap()
}

fn two_inputs(skip_a: bool, skip_b: bool) -> Config {
    Config::from_yaml_str(&format!(
        r#"
inputs:
  A:
    metadata: data/a_metadata.tsv
    sequences: data/a_sequences.fasta
    skip_sanitize_metadata: {skip_a}
  B:
    metadata: s3://bucket/b_metadata.tsv.xz
    sequences: s3://bucket/b_sequences.fasta.xz
    aligned: s3://bucket/b_aligned.fasta.xz
    skip_sanitize_metadata: {skip_b}
builds:
  global: {{}}
  europe_6m:
    region: Europe
"#
    ))
    .unwrap()
}

#[test]
fn single_input_uses_sanitized_metadata() {
    let config = single_input();
    assert_eq!(
        unified_metadata(&config).unwrap(),
        ArtifactPlan::Passthrough("results/sanitized_metadata_A.tsv.xz".to_string())
    );
}

#[test]
fn several_inputs_always_combine_metadata() {
    for (skip_a, skip_b) in [(false, false), (true, false), (false, true), (true, true)] {
        let config = two_inputs(skip_a, skip_b);
        assert_eq!(
            unified_metadata(&config).unwrap(),
            ArtifactPlan::Combined("results/combined_metadata.tsv.xz".to_string())
        );
    }
}

#[test]
fn single_input_alignment_passes_through() {
    let config = single_input();
    assert_eq!(
        unified_alignment(&config).unwrap(),
        ArtifactPlan::Passthrough("results/aligned_A.fasta.xz".to_string())
    );

    let mut preset = single_input();
    preset.inputs["A"].aligned = Some("data/a_aligned.fasta.xz".to_string());
    assert_eq!(unified_alignment(&preset).unwrap().path(), "data/a_aligned.fasta.xz");
}

#[test]
fn several_inputs_combine_alignment() {
    let config = two_inputs(false, false);
    assert_eq!(
        unified_alignment(&config).unwrap(),
        ArtifactPlan::Combined("results/combined_sequences_for_subsampling.fasta.xz".to_string())
    );
}

#[test]
fn build_metadata_depends_on_region() {
    let config = single_input();
    assert_eq!(
        metadata_for_build(&config, "global").unwrap(),
        "results/sanitized_metadata_A.tsv.xz"
    );
    assert_eq!(
        metadata_for_build(&config, "custom_build").unwrap(),
        "results/sanitized_metadata_A.tsv.xz"
    );
    assert_eq!(
        metadata_for_build(&config, "europe_6m").unwrap(),
        "results/europe_6m/metadata_adjusted.tsv.xz"
    );
    assert_matches!(
        metadata_for_build(&config, "asia_6m"),
        Err(ResolveError::UnknownBuild(_))
    );
}

#[test]
fn paths_for_remote_and_local_inputs() {
    let config = two_inputs(false, false);
    assert_eq!(
        path_for(&config, Stage::Sequences, "B").unwrap(),
        "s3://bucket/b_sequences.fasta.xz"
    );
    assert_eq!(
        path_for(&config, Stage::Aligned, "B").unwrap(),
        "s3://bucket/b_aligned.fasta.xz"
    );
    assert_eq!(
        path_for_stage_name(&config, "aligned", "A").unwrap(),
        "results/aligned_A.fasta.xz"
    );
    assert_matches!(
        path_for_stage_name(&config, "tree", "A"),
        Err(ResolveError::UnknownStage(stage)) if stage == "tree"
    );
}
