use chrono::{Datelike, Days, Local, NaiveDate, TimeDelta};

use crate::config::{Config, Setting};
use crate::error::ResolveError;
use crate::resolve::frequency_value;

const MIN_DATE_LOOKBACK_WEEKS: i64 = 52;

/// Fractional-year representation of `date`, or of today when `None`.
///
/// `2021-01-01` becomes `2021 + 0.5 / 365`. `None` means no value is
/// available.
pub fn numeric_date(date: Option<NaiveDate>) -> Option<f64> {
    let date = date.unwrap_or_else(today);
    let leap = NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some();
    let days_in_year = if leap { 366.0 } else { 365.0 };
    let value = f64::from(date.year()) + (f64::from(date.ordinal()) - 0.5) / days_in_year;
    value.is_finite().then_some(value)
}

/// Accepts `YYYY-MM-DD` or a value that is already numeric.
pub fn numeric_date_from_str(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => numeric_date(Some(date)),
        Err(err) => {
            tracing::warn!(
                value = text,
                error = %err,
                "unparseable date, no numeric value available"
            );
            None
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn setting_to_numeric_date(setting: &Setting) -> Option<f64> {
    match setting {
        Setting::Integer(_) | Setting::Float(_) => setting.as_f64(),
        Setting::Text(text) => numeric_date_from_str(text),
        _ => {
            tracing::warn!(?setting, "date setting is neither a number nor a date");
            None
        }
    }
}

/// Earliest date for frequency estimation of `build_name`.
///
/// Falls back to 52 weeks before `today` when neither the build nor the
/// global `frequencies` section sets `min_date`.
pub fn min_date_for_frequencies(
    config: &Config,
    build_name: &str,
    today: NaiveDate,
) -> Option<f64> {
    if let Some(setting) = frequency_value(config, build_name, "min_date") {
        return setting_to_numeric_date(setting);
    }
    let start = today.checked_sub_signed(TimeDelta::weeks(MIN_DATE_LOOKBACK_WEEKS))?;
    numeric_date(Some(start))
}

/// Latest date for frequency estimation of `build_name`.
///
/// Defaults to `today` minus `recent_days_to_censor` days (0 when unset) so
/// that unevenly sampled recent days can be left out.
pub fn max_date_for_frequencies(
    config: &Config,
    build_name: &str,
    today: NaiveDate,
) -> Result<Option<f64>, ResolveError> {
    if let Some(setting) = frequency_value(config, build_name, "max_date") {
        return Ok(setting_to_numeric_date(setting));
    }
    let censored = match frequency_value(config, build_name, "recent_days_to_censor") {
        Some(setting) => setting
            .as_integer()
            .and_then(|days| u64::try_from(days).ok())
            .ok_or_else(|| ResolveError::InvalidSetting {
                key: "frequencies.recent_days_to_censor".to_string(),
                reason: format!("expected a non-negative number of days, got {setting}"),
            })?,
        None => 0,
    };
    Ok(today
        .checked_sub_days(Days::new(censored))
        .and_then(|end| numeric_date(Some(end))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn first_day_of_common_and_leap_years() {
        assert_eq!(numeric_date(Some(date(2021, 1, 1))), Some(2021.0 + 0.5 / 365.0));
        assert_eq!(numeric_date(Some(date(2020, 1, 1))), Some(2020.0 + 0.5 / 366.0));
    }

    #[test]
    fn last_day_of_leap_year() {
        assert_eq!(numeric_date(Some(date(2020, 12, 31))), Some(2020.0 + 365.5 / 366.0));
    }

    #[test]
    fn today_is_used_without_argument() {
        let value = numeric_date(None).unwrap();
        assert_eq!(value.floor() as i32, today().year());
    }

    #[test]
    fn unparseable_text_is_unavailable() {
        assert_eq!(numeric_date_from_str("2021-02-30"), None);
        assert_eq!(numeric_date_from_str("last tuesday"), None);
        assert_eq!(numeric_date_from_str("2020.25"), Some(2020.25));
        assert_eq!(numeric_date_from_str("2021-01-01"), Some(2021.0 + 0.5 / 365.0));
    }
}
