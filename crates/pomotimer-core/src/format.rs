//! Conversions between second counts and the `M:SS` display string.

use crate::error::FormatError;

/// Render seconds as `M:SS`.
///
/// Minutes are the unpadded quotient by 60, seconds the zero-padded
/// remainder: `90 -> "1:30"`, `5 -> "0:05"`, `1500 -> "25:00"`.
pub fn format_minutes_seconds(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn minutes_to_seconds(minutes: u64) -> u64 {
    minutes.saturating_mul(60)
}

/// Inverse of [`format_minutes_seconds`].
///
/// # Errors
/// Returns an error when the separator is missing, either part is not a
/// whole number, or the seconds part is 60 or more.
pub fn parse_minutes_seconds(value: &str) -> Result<u64, FormatError> {
    let (minutes, seconds) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| FormatError::MissingSeparator(value.to_string()))?;

    let minutes: u64 = minutes
        .parse()
        .map_err(|_| FormatError::NotANumber(minutes.to_string()))?;
    let seconds: u64 = seconds
        .parse()
        .map_err(|_| FormatError::NotANumber(seconds.to_string()))?;

    if seconds >= 60 {
        return Err(FormatError::SecondsOutOfRange(seconds));
    }
    Ok(minutes_to_seconds(minutes) + seconds)
}
