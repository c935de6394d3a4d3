//! Command-line fragments compiled from resolved filter settings.

use crate::config::{Config, Setting};
use crate::error::ResolveError;
use crate::resolve::resolve_filter_value;
use crate::shell::{quote, quote_words};

const SKIP_DIAGNOSTICS: &str = "skip_diagnostics";
const MIN_LENGTH: &str = "min_length";
const EXCLUDE_WHERE: &str = "exclude_where";

/// `--skip-inputs` listing, in config order, every input whose diagnostics are
/// skipped. Empty when no input skips them.
pub fn skipped_inputs_argument(
    config: &Config,
    build_name: Option<&str>,
) -> Result<String, ResolveError> {
    let mut skipped = Vec::new();
    for input_name in config.input_names() {
        let skip = resolve_filter_value(config, build_name, Some(input_name), SKIP_DIAGNOSTICS)?
            .is_some_and(Setting::is_truthy);
        if skip {
            skipped.push(input_name);
        }
    }

    if skipped.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("--skip-inputs {}", skipped.join(" ")))
}

fn min_length_for(
    config: &Config,
    build_name: Option<&str>,
    input_name: &str,
) -> Result<i64, ResolveError> {
    let setting = resolve_filter_value(config, build_name, Some(input_name), MIN_LENGTH)?
        .ok_or_else(|| ResolveError::MissingConfigValue(format!("filter.{MIN_LENGTH}")))?;
    setting.as_integer().ok_or_else(|| ResolveError::InvalidSetting {
        key: format!("filter.{MIN_LENGTH}"),
        reason: format!("expected an integer length for input `{input_name}`, got {setting}"),
    })
}

fn column_reference(input_name: &str) -> Result<String, ResolveError> {
    if input_name.contains('`') {
        return Err(ResolveError::InvalidSetting {
            key: format!("inputs.{input_name}"),
            reason: "input names used as query columns cannot contain backticks".to_string(),
        });
    }
    Ok(format!("`{input_name}`"))
}

/// Query keeping sequences at least as long as the minimum set for the input
/// they came from.
///
/// With several inputs the merged metadata carries one `yes`/`no` column per
/// input, so each input gets its own clause.
pub fn min_length_query(config: &Config, build_name: Option<&str>) -> Result<String, ResolveError> {
    let query = match config.single_input() {
        Some((input_name, _)) => {
            let min_length = min_length_for(config, build_name, input_name)?;
            format!("(_length >= {min_length})")
        }
        None => {
            let clauses = config
                .input_names()
                .map(|input_name| {
                    let min_length = min_length_for(config, build_name, input_name)?;
                    let column = column_reference(input_name)?;
                    Ok(format!("({column} == 'yes' & _length >= {min_length})"))
                })
                .collect::<Result<Vec<_>, ResolveError>>()?;
            if clauses.is_empty() {
                return Err(ResolveError::MissingConfigValue("inputs".to_string()));
            }
            format!("({})", clauses.join(" | "))
        }
    };

    tracing::debug!(build = ?build_name, %query, "compiled length filter");
    Ok(format!("--query {}", quote(&query)))
}

/// `--exclude-where` with the configured conditions re-quoted word by word.
pub fn exclude_where_argument(
    config: &Config,
    build_name: Option<&str>,
) -> Result<String, ResolveError> {
    let words = match resolve_filter_value(config, build_name, None, EXCLUDE_WHERE)? {
        None => return Ok(String::new()),
        Some(Setting::List(items)) => items
            .iter()
            .map(|item| quote(&item.to_string()))
            .collect::<Vec<_>>()
            .join(" "),
        Some(setting) => quote_words(&setting.to_string())?,
    };

    if words.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("--exclude-where {words}"))
}
