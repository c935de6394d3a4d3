use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use ncov_resolve::config::{Config, ConfigLoader};
use ncov_resolve::dates::{self, max_date_for_frequencies, min_date_for_frequencies};
use ncov_resolve::domain::Stage;
use ncov_resolve::error::ResolveError;
use ncov_resolve::filter::{exclude_where_argument, min_length_query, skipped_inputs_argument};
use ncov_resolve::output::{
    FrequencyWindowResult, Output, OutputMode, TraitsResult, ValueResult,
};
use ncov_resolve::paths::path_for;
use ncov_resolve::plan::{metadata_for_build, unified_alignment, unified_metadata};
use ncov_resolve::resolve::{sampling_bias_correction, subsampling_scheme, trait_columns};
use ncov_resolve::upload::upload_manifest;

#[derive(Parser)]
#[command(name = "ncov-resolve")]
#[command(about = "Resolve workflow config values and derived artifact paths")]
#[command(version)]
struct Cli {
    /// Workflow config (YAML, or JSON by extension). Defaults to config.yaml.
    #[arg(long, global = true)]
    config: Option<String>,

    /// Reference date for default frequency windows.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct BuildArgs {
    #[arg(long)]
    build: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Check that the config is complete")]
    Validate,
    #[command(about = "Location of a stage's artifact for an input")]
    Path { stage: Stage, input: String },
    #[command(about = "Metadata path, unified or for one build")]
    Metadata(BuildArgs),
    #[command(about = "Alignment path used for subsampling")]
    Alignment,
    #[command(about = "--skip-inputs argument for diagnostics")]
    SkipInputs(BuildArgs),
    #[command(about = "--query argument enforcing minimum lengths")]
    LengthQuery(BuildArgs),
    #[command(about = "--exclude-where argument")]
    ExcludeWhere(BuildArgs),
    #[command(about = "Trait columns and sampling bias correction of a build")]
    Traits { build: String },
    #[command(about = "Frequency window of a build")]
    Frequencies { build: String },
    #[command(about = "Subsampling scheme of a build")]
    SubsamplingScheme { build: String },
    #[command(about = "Remote to local mapping of files to publish")]
    UploadManifest,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ResolveError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ResolveError) -> u8 {
    match error {
        ResolveError::MissingConfig
        | ResolveError::ConfigRead(_)
        | ResolveError::ConfigParse(_)
        | ResolveError::MissingRequiredInput { .. }
        | ResolveError::UnsupportedScope { .. }
        | ResolveError::MultipleOriginsUnsupported { .. }
        | ResolveError::UnknownBuild(_)
        | ResolveError::UnknownInput(_)
        | ResolveError::DuplicateUploadTarget { .. }
        | ResolveError::MissingConfigValue(_)
        | ResolveError::InvalidSetting { .. } => 2,
        ResolveError::UnknownStage(_) | ResolveError::MalformedShellText(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let today = cli.today.unwrap_or_else(dates::today);

    run_command(cli.command, &config, today, mode)
}

fn run_command(
    command: Command,
    config: &Config,
    today: NaiveDate,
    mode: OutputMode,
) -> miette::Result<()> {
    match command {
        Command::Validate => {
            tracing::info!(
                inputs = config.inputs.len(),
                builds = config.builds.len(),
                "config is valid"
            );
            print_value(mode, "ok".to_string())
        }
        Command::Path { stage, input } => print_value(mode, path_for(config, stage, &input)?),
        Command::Metadata(args) => match args.build {
            Some(build) => print_value(mode, metadata_for_build(config, &build)?),
            None => Output::print(mode, &unified_metadata(config)?).into_diagnostic(),
        },
        Command::Alignment => Output::print(mode, &unified_alignment(config)?).into_diagnostic(),
        Command::SkipInputs(args) => {
            print_value(mode, skipped_inputs_argument(config, args.build.as_deref())?)
        }
        Command::LengthQuery(args) => {
            print_value(mode, min_length_query(config, args.build.as_deref())?)
        }
        Command::ExcludeWhere(args) => {
            print_value(mode, exclude_where_argument(config, args.build.as_deref())?)
        }
        Command::Traits { build } => {
            let result = TraitsResult {
                columns: trait_columns(config, &build)?,
                sampling_bias_correction: sampling_bias_correction(config, &build),
                build,
            };
            Output::print(mode, &result).into_diagnostic()
        }
        Command::Frequencies { build } => {
            let result = FrequencyWindowResult {
                min_date: min_date_for_frequencies(config, &build, today),
                max_date: max_date_for_frequencies(config, &build, today)?,
                build,
            };
            Output::print(mode, &result).into_diagnostic()
        }
        Command::SubsamplingScheme { build } => {
            print_value(mode, subsampling_scheme(config, &build)?)
        }
        Command::UploadManifest => {
            Output::print(mode, &upload_manifest(config)?).into_diagnostic()
        }
    }
}

fn print_value(mode: OutputMode, value: String) -> miette::Result<()> {
    Output::print(mode, &ValueResult { value }).into_diagnostic()
}
