use std::fmt;
use std::fs;

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::domain::Stage;
use crate::error::ResolveError;
use crate::resolve::check_filter_scopes;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_AUSPICE_PREFIX: &str = "ncov";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inputs: IndexMap<String, InputDescriptor>,
    #[serde(default)]
    pub builds: IndexMap<String, BuildDescriptor>,
    #[serde(default)]
    pub filter: Section,
    #[serde(default)]
    pub traits: IndexMap<String, TraitsEntry>,
    #[serde(default)]
    pub frequencies: Section,
    #[serde(default, rename = "S3_DST_ORIGINS")]
    pub s3_dst_origins: Vec<String>,
    #[serde(default)]
    pub auspice_json_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDescriptor {
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub sequences: Option<String>,
    #[serde(default)]
    pub aligned: Option<String>,
    #[serde(default)]
    pub skip_sanitize_metadata: bool,
}

impl InputDescriptor {
    /// Configured location for `stage`. Blank strings count as unset.
    pub fn location(&self, stage: Stage) -> Option<&str> {
        let value = match stage {
            Stage::Metadata => self.metadata.as_deref(),
            Stage::Sequences => self.sequences.as_deref(),
            Stage::Aligned => self.aligned.as_deref(),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDescriptor {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subsampling_scheme: Option<String>,
    #[serde(default)]
    pub filter: Section,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraitsEntry {
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub sampling_bias_correction: Option<f64>,
}

/// Scalar or list value found in a config section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Setting {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Setting>),
}

impl Setting {
    pub fn is_truthy(&self) -> bool {
        match self {
            Setting::Bool(value) => *value,
            Setting::Integer(value) => *value != 0,
            Setting::Float(value) => *value != 0.0,
            Setting::Text(value) => !value.is_empty(),
            Setting::List(values) => !values.is_empty(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Setting::Integer(value) => Some(*value),
            Setting::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Setting::Integer(value) => Some(*value as f64),
            Setting::Float(value) => Some(*value),
            Setting::Text(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Setting::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Bool(value) => write!(f, "{value}"),
            Setting::Integer(value) => write!(f, "{value}"),
            Setting::Float(value) => write!(f, "{value}"),
            Setting::Text(value) => f.write_str(value),
            Setting::List(values) => {
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SectionEntry {
    Scope(IndexMap<String, Option<Setting>>),
    Value(Setting),
}

/// A config section holding settings next to named sub-scopes.
///
/// `filter` keeps global settings beside per-input scopes and `frequencies`
/// keeps them beside per-build scopes. Mapping-valued entries become scopes;
/// null values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "IndexMap<String, Option<SectionEntry>>")]
pub struct Section {
    values: IndexMap<String, Setting>,
    scopes: IndexMap<String, IndexMap<String, Setting>>,
}

impl From<IndexMap<String, Option<SectionEntry>>> for Section {
    fn from(entries: IndexMap<String, Option<SectionEntry>>) -> Self {
        let mut section = Section::default();
        for (key, entry) in entries {
            match entry {
                Some(SectionEntry::Scope(scope)) => {
                    let scope = scope
                        .into_iter()
                        .filter_map(|(key, value)| value.map(|value| (key, value)))
                        .collect();
                    section.scopes.insert(key, scope);
                }
                Some(SectionEntry::Value(value)) => {
                    section.values.insert(key, value);
                }
                None => {}
            }
        }
        section
    }
}

impl Section {
    pub fn value(&self, key: &str) -> Option<&Setting> {
        self.values.get(key)
    }

    pub fn scope(&self, name: &str) -> Option<&IndexMap<String, Setting>> {
        self.scopes.get(name)
    }

    pub fn scope_value(&self, name: &str, key: &str) -> Option<&Setting> {
        self.scope(name).and_then(|scope| scope.get(key))
    }

    #[cfg(test)]
    pub(crate) fn with_scope_value(
        mut self,
        name: impl Into<String>,
        key: impl Into<String>,
        value: Setting,
    ) -> Self {
        self.scopes
            .entry(name.into())
            .or_default()
            .insert(key.into(), value);
        self
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, ResolveError> {
        serde_yaml::from_str(content).map_err(|err| ResolveError::ConfigParse(err.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(content).map_err(|err| ResolveError::ConfigParse(err.to_string()))
    }

    /// Checks that every input provides the stages that cannot be derived and
    /// that no per-input filter scope sets a global-only key.
    pub fn validate(&self) -> Result<(), ResolveError> {
        for (name, input) in &self.inputs {
            for stage in [Stage::Metadata, Stage::Sequences] {
                if input.location(stage).is_none() {
                    return Err(ResolveError::MissingRequiredInput {
                        input: name.clone(),
                        stage: stage.to_string(),
                    });
                }
            }
        }
        check_filter_scopes(self)
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// The input name when exactly one input is configured.
    pub fn single_input(&self) -> Option<(&str, &InputDescriptor)> {
        if self.inputs.len() != 1 {
            return None;
        }
        self.inputs
            .first()
            .map(|(name, input)| (name.as_str(), input))
    }

    pub fn build(&self, name: &str) -> Result<&BuildDescriptor, ResolveError> {
        self.builds
            .get(name)
            .ok_or_else(|| ResolveError::UnknownBuild(name.to_string()))
    }

    pub fn auspice_prefix(&self) -> &str {
        self.auspice_json_prefix
            .as_deref()
            .unwrap_or(DEFAULT_AUSPICE_PREFIX)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<Config, ResolveError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(ResolveError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ResolveError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config = match config_path.extension() {
            Some("json") => Config::from_json_str(&content)?,
            _ => Config::from_yaml_str(&content)?,
        };
        config.validate()?;

        tracing::debug!(
            path = %config_path,
            inputs = config.inputs.len(),
            builds = config.builds.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}
