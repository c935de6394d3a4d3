use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("config->inputs->{input}->{stage} is not defined")]
    #[diagnostic(help("every input must provide both `metadata` and `sequences`"))]
    MissingRequiredInput { input: String, stage: String },

    #[error("no path can be derived for unknown stage \"{0}\"")]
    UnknownStage(String),

    #[error(
        "per-input filter parameter `{key}` under input `{input}` is no longer supported; \
         set it in the global `filter` section instead"
    )]
    UnsupportedScope { key: String, input: String },

    #[error("upload requires exactly one destination origin, found {count}")]
    MultipleOriginsUnsupported { count: usize },

    #[error("malformed shell text: {0}")]
    MalformedShellText(String),

    #[error("missing config file config.yaml in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    #[error("build `{0}` is not defined under config->builds")]
    UnknownBuild(String),

    #[error("input `{0}` is not defined under config->inputs")]
    UnknownInput(String),

    #[error("upload target `{remote}` from build `{build}` is already claimed by another build")]
    #[diagnostic(help("builds publishing under the same upload name would overwrite each other"))]
    DuplicateUploadTarget { remote: String, build: String },

    #[error("config value `{0}` is not defined")]
    MissingConfigValue(String),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },
}
