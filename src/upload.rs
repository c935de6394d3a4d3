use std::collections::BTreeMap;

use crate::config::Config;
use crate::domain::BuildIdentity;
use crate::error::ResolveError;
use crate::paths::{RESULTS_DIR, auspice_path, build_results_path};

/// Remote relative name to local result path.
pub type UploadManifest = BTreeMap<String, String>;

/// The single destination origin, which also names the input whose
/// intermediates are published.
pub fn destination_origin(config: &Config) -> Result<&str, ResolveError> {
    match config.s3_dst_origins.as_slice() {
        [origin] => Ok(origin.as_str()),
        origins => Err(ResolveError::MultipleOriginsUnsupported {
            count: origins.len(),
        }),
    }
}

fn origin_entries(origin: &str) -> [(String, String); 4] {
    [
        (
            "aligned.fasta.xz".to_string(),
            format!("{RESULTS_DIR}/aligned_{origin}.fasta.xz"),
        ),
        (
            "masked.fasta.xz".to_string(),
            format!("{RESULTS_DIR}/masked_{origin}.fasta.xz"),
        ),
        (
            "filtered.fasta.xz".to_string(),
            format!("{RESULTS_DIR}/filtered_{origin}.fasta.xz"),
        ),
        (
            "mutation-summary.tsv.xz".to_string(),
            format!("{RESULTS_DIR}/mutation_summary_{origin}.tsv.xz"),
        ),
    ]
}

fn build_entries(upload_name: &str, build_name: &str, prefix: &str) -> [(String, String); 7] {
    let remote = |file_name: &str| format!("{upload_name}/{file_name}");
    [
        (
            remote("sequences.fasta.xz"),
            build_results_path(build_name, &format!("{build_name}_subsampled_sequences.fasta.xz")),
        ),
        (
            remote("metadata.tsv.xz"),
            build_results_path(build_name, &format!("{build_name}_subsampled_metadata.tsv.xz")),
        ),
        (
            remote("aligned.fasta.xz"),
            build_results_path(build_name, "aligned.fasta.xz"),
        ),
        (remote("tree.nwk"), build_results_path(build_name, "tree.nwk")),
        (
            remote(format!("{upload_name}.json").as_str()),
            auspice_path(prefix, build_name, ""),
        ),
        (
            remote(format!("{upload_name}_tip-frequencies.json").as_str()),
            auspice_path(prefix, build_name, "_tip-frequencies"),
        ),
        (
            remote(format!("{upload_name}_root-sequence.json").as_str()),
            auspice_path(prefix, build_name, "_root-sequence"),
        ),
    ]
}

/// Files to publish for the configured builds.
///
/// Region builds are published under the bare region name, and only their
/// six-month variant is included. Other builds keep their own name. Two
/// builds sharing an upload name are rejected.
pub fn upload_manifest(config: &Config) -> Result<UploadManifest, ResolveError> {
    let origin = destination_origin(config)?;
    let prefix = config.auspice_prefix();

    let mut manifest: UploadManifest = origin_entries(origin).into_iter().collect();
    for build_name in config.builds.keys() {
        let identity = BuildIdentity::from_build_name(build_name);
        let Some(upload_name) = identity.upload_name() else {
            tracing::debug!(build = %build_name, "region timespan not published, skipping");
            continue;
        };
        for (remote, local) in build_entries(&upload_name, build_name, prefix) {
            if manifest.contains_key(&remote) {
                return Err(ResolveError::DuplicateUploadTarget {
                    remote,
                    build: build_name.clone(),
                });
            }
            manifest.insert(remote, local);
        }
    }

    tracing::debug!(origin, entries = manifest.len(), "assembled upload manifest");
    Ok(manifest)
}
