//! The `"<mean> +/- <sigma>"` text format.
//!
//! Sigma is written with two significant digits and the mean is rounded to
//! the same decimal place, so a printed value never claims more precision
//! than its uncertainty supports. Parsing accepts any amount of whitespace
//! around the `+`, `/`, `-` tokens.

use std::fmt;

use crate::error::{Result, UncertainError};

/// Number of decimal places that keeps two significant digits of `sigma`,
/// negative when rounding lands left of the decimal point.
fn decimals_for(sigma: f64) -> i32 {
    let first = sigma.log10().floor() as i32;
    let rounded = round_to(sigma, 1 - first);
    1 - rounded.log10().floor() as i32
}

fn round_to(x: f64, decimals: i32) -> f64 {
    if decimals >= 0 {
        let k = 10f64.powi(decimals);
        (x * k).round() / k
    } else {
        let k = 10f64.powi(-decimals);
        (x / k).round() * k
    }
}

/// Writes `mean +/- sigma` with sigma rounded to two significant digits.
///
/// A zero or non-finite sigma is written as-is alongside the full mean.
pub fn write_mean_sigma(f: &mut fmt::Formatter<'_>, mean: f64, sigma: f64) -> fmt::Result {
    f.write_str(&format_mean_sigma(mean, sigma))
}

/// Renders `mean +/- sigma` as a `String`.
///
/// # Examples
/// ```
/// use u_uncertain::format::format_mean_sigma;
/// assert_eq!(format_mean_sigma(2.0, 1.0), "2.0 +/- 1.0");
/// assert_eq!(format_mean_sigma(3.14159, 0.0123), "3.142 +/- 0.012");
/// assert_eq!(format_mean_sigma(56789.0, 1234.0), "56800 +/- 1200");
/// assert_eq!(format_mean_sigma(5.0, 0.0), "5 +/- 0");
/// ```
pub fn format_mean_sigma(mean: f64, sigma: f64) -> String {
    let magnitude = sigma.abs();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return format!("{mean} +/- {sigma}");
    }
    let decimals = decimals_for(magnitude);
    if decimals >= 0 {
        let d = decimals as usize;
        format!("{mean:.d$} +/- {sigma:.d$}")
    } else {
        let mean = round_to(mean, decimals);
        let sigma = round_to(sigma, decimals);
        format!("{mean:.0} +/- {sigma:.0}")
    }
}

/// Parses `"<mean> +/- <sigma>"` into its two numbers.
///
/// # Errors
/// Returns [`UncertainError::Format`] when the `+ / -` token sequence is
/// missing or either number does not parse.
///
/// # Examples
/// ```
/// use u_uncertain::format::parse_mean_sigma;
/// assert_eq!(parse_mean_sigma("2.5 +/- 0.1").unwrap(), (2.5, 0.1));
/// assert_eq!(parse_mean_sigma("-1e+3 + / - 20").unwrap(), (-1000.0, 20.0));
/// assert!(parse_mean_sigma("2.5 -/+ 0.1").is_err());
/// ```
pub fn parse_mean_sigma(text: &str) -> Result<(f64, f64)> {
    for (i, c) in text.char_indices() {
        if c != '+' {
            continue;
        }
        let Some(rest) = text[i + 1..].trim_start().strip_prefix('/') else {
            continue;
        };
        let Some(sigma_text) = rest.trim_start().strip_prefix('-') else {
            continue;
        };
        let mean = parse_number(text[..i].trim(), text)?;
        let sigma = parse_number(sigma_text.trim(), text)?;
        return Ok((mean, sigma));
    }
    Err(UncertainError::Format(format!(
        "expected `<mean> +/- <sigma>`, got {text:?}"
    )))
}

fn parse_number(token: &str, text: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|e| UncertainError::Format(format!("invalid number {token:?} in {text:?}: {e}")))
}
