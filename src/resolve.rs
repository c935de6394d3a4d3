//! Precedence rules across the default, build and input layers of the config.
//!
//! Filter settings resolve most-specific-first:
//!
//! 1. `builds.<build>.filter.<input>.<key>`
//! 2. `builds.<build>.filter.<key>`
//! 3. `filter.<input>.<key>`
//! 4. `filter.<key>`
//!
//! Only the keys in [`PER_INPUT_FILTER_KEYS`] may appear inside a per-input
//! scope. Any other key there is rejected, whatever its value.

use crate::config::{BuildDescriptor, Config, Section, Setting};
use crate::error::ResolveError;

/// Filter keys that may still be set per input.
pub const PER_INPUT_FILTER_KEYS: [&str; 2] = ["min_length", "skip_diagnostics"];

pub const DEFAULT_TRAITS_ENTRY: &str = "default";

fn allows_per_input(key: &str) -> bool {
    PER_INPUT_FILTER_KEYS.contains(&key)
}

fn reject_per_input(section: &Section, input_name: &str, key: &str) -> Result<(), ResolveError> {
    if !allows_per_input(key) && section.scope_value(input_name, key).is_some() {
        return Err(ResolveError::UnsupportedScope {
            key: key.to_string(),
            input: input_name.to_string(),
        });
    }
    Ok(())
}

/// Rejects every per-input scope, at global or build level, that carries a
/// global-only key.
pub fn check_filter_scopes(config: &Config) -> Result<(), ResolveError> {
    let sections = std::iter::once(&config.filter).chain(config.builds.values().map(|b| &b.filter));
    for section in sections {
        for input_name in config.input_names() {
            if let Some(scope) = section.scope(input_name) {
                for key in scope.keys() {
                    reject_per_input(section, input_name, key)?;
                }
            }
        }
    }
    Ok(())
}

/// Effective filter value for `key`, or `None` when no layer sets it.
pub fn resolve_filter_value<'a>(
    config: &'a Config,
    build_name: Option<&str>,
    input_name: Option<&str>,
    key: &str,
) -> Result<Option<&'a Setting>, ResolveError> {
    let build: Option<&BuildDescriptor> = build_name.map(|name| config.build(name)).transpose()?;

    // Without an input every configured input scope still counts.
    let checked_inputs: Vec<&str> = match input_name {
        Some(name) => vec![name],
        None => config.input_names().collect(),
    };
    for name in checked_inputs {
        reject_per_input(&config.filter, name, key)?;
        if let Some(build) = build {
            reject_per_input(&build.filter, name, key)?;
        }
    }

    let layers = [
        ("build input", build.zip(input_name).and_then(|(b, i)| b.filter.scope_value(i, key))),
        ("build", build.and_then(|b| b.filter.value(key))),
        ("input", input_name.and_then(|i| config.filter.scope_value(i, key))),
        ("default", config.filter.value(key)),
    ];
    let resolved = layers.into_iter().find_map(|(layer, value)| value.map(|v| (layer, v)));

    match resolved {
        Some((layer, value)) => {
            tracing::trace!(
                key,
                build = ?build_name,
                input = ?input_name,
                layer,
                %value,
                "resolved filter value"
            );
            Ok(Some(value))
        }
        None => {
            tracing::trace!(
                key,
                build = ?build_name,
                input = ?input_name,
                "filter value not configured"
            );
            Ok(None)
        }
    }
}

/// Trait columns for `build_name`, falling back to the `default` entry.
pub fn trait_columns(config: &Config, build_name: &str) -> Result<Vec<String>, ResolveError> {
    [build_name, DEFAULT_TRAITS_ENTRY]
        .into_iter()
        .find_map(|name| config.traits.get(name).and_then(|entry| entry.columns.clone()))
        .ok_or_else(|| ResolveError::MissingConfigValue("traits.default.columns".to_string()))
}

pub fn sampling_bias_correction(config: &Config, build_name: &str) -> Option<f64> {
    [build_name, DEFAULT_TRAITS_ENTRY]
        .into_iter()
        .find_map(|name| config.traits.get(name).and_then(|entry| entry.sampling_bias_correction))
}

/// Subsampling scheme of a build. Builds without one use a scheme named
/// after the build itself.
pub fn subsampling_scheme(config: &Config, build_name: &str) -> Result<String, ResolveError> {
    let build = config.build(build_name)?;
    Ok(build
        .subsampling_scheme
        .clone()
        .unwrap_or_else(|| build_name.to_string()))
}

/// `frequencies.<build>.<key>`, else `frequencies.<key>`.
pub fn frequency_value<'a>(config: &'a Config, build_name: &str, key: &str) -> Option<&'a Setting> {
    config
        .frequencies
        .scope_value(build_name, key)
        .or_else(|| config.frequencies.value(key))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> Config {
        Config::from_yaml_str(
            r#"
inputs:
  gisaid: {metadata: data/gisaid.tsv, sequences: data/gisaid.fasta}
  aus: {metadata: data/aus.tsv, sequences: data/aus.fasta}
builds:
  europe_6m:
    region: Europe
    filter:
      min_length: 25000
      aus:
        min_length: 20000
  custom: {}
filter:
  min_length: 27000
  exclude_where: "region!=Europe"
  gisaid:
    min_length: 26000
"#,
        )
        .unwrap()
    }

    #[test]
    fn most_specific_layer_wins() {
        let config = config();
        let value = |build: Option<&str>, input: Option<&str>| {
            resolve_filter_value(&config, build, input, "min_length")
                .unwrap()
                .cloned()
        };
        assert_eq!(value(None, None), Some(Setting::Integer(27000)));
        assert_eq!(value(None, Some("gisaid")), Some(Setting::Integer(26000)));
        assert_eq!(value(None, Some("aus")), Some(Setting::Integer(27000)));
        assert_eq!(value(Some("europe_6m"), Some("gisaid")), Some(Setting::Integer(25000)));
        assert_eq!(value(Some("europe_6m"), Some("aus")), Some(Setting::Integer(20000)));
        assert_eq!(value(Some("custom"), Some("gisaid")), Some(Setting::Integer(26000)));
    }

    #[test]
    fn absent_key_is_not_configured() {
        let config = config();
        let value =
            resolve_filter_value(&config, Some("custom"), Some("aus"), "skip_diagnostics").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn unknown_build_is_rejected() {
        let config = config();
        let err = resolve_filter_value(&config, Some("asia_6m"), None, "min_length").unwrap_err();
        assert_matches!(err, ResolveError::UnknownBuild(name) if name == "asia_6m");
    }

    #[test]
    fn build_level_per_input_scope_checked() {
        let mut config = config();
        config.builds["custom"].filter = Section::default().with_scope_value(
            "aus",
            "exclude_where",
            Setting::Text("country=Australia".to_string()),
        );
        let err = resolve_filter_value(&config, Some("custom"), Some("aus"), "exclude_where")
            .unwrap_err();
        assert_matches!(
            err,
            ResolveError::UnsupportedScope { key, input }
                if key == "exclude_where" && input == "aus"
        );
        assert_matches!(check_filter_scopes(&config), Err(ResolveError::UnsupportedScope { .. }));
    }

    #[test]
    fn input_less_lookup_still_rejects_input_scopes() {
        let mut config = config();
        config.filter = std::mem::take(&mut config.filter).with_scope_value(
            "aus",
            "exclude_where",
            Setting::Text("country=Australia".to_string()),
        );
        assert_matches!(
            resolve_filter_value(&config, None, None, "exclude_where"),
            Err(ResolveError::UnsupportedScope { key, input })
                if key == "exclude_where" && input == "aus"
        );
        assert_matches!(
            resolve_filter_value(&config, Some("custom"), None, "exclude_where"),
            Err(ResolveError::UnsupportedScope { .. })
        );
        assert!(resolve_filter_value(&config, None, None, "min_length").is_ok());
    }
}
