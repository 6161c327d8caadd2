use chrono::NaiveDate;

use crate::models::UNKNOWN_LABEL;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Round to the requested decimal places. Add a tiny epsilon before
    // rounding to avoid IEEE 754 binary-representation issues at exact
    // midpoints.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let int_str = integer_part.to_string();
    let grouped = group_thousands(&int_str);

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50". Strip the leading "0".
        let decimal_digits = &frac_str[1..];
        format!("{}{}", grouped, decimal_digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Round an already-computed percentage for display.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_rate;
///
/// assert_eq!(format_rate(100.0 / 3.0), "33.3%");
/// assert_eq!(format_rate(0.0), "0.0%");
/// ```
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Format an optional calendar date in the source's DD-MM-YYYY convention.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use insight_core::formatting::format_date;
///
/// let day = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
/// assert_eq!(format_date(Some(day)), "09-02-2024");
/// assert_eq!(format_date(None), "-");
/// ```
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d-%m-%Y").to_string(),
        None => "-".to_string(),
    }
}

/// Format a throughput duration in days; unknown durations render as "-",
/// never as 0.
///
/// # Examples
///
/// ```
/// use insight_core::formatting::format_duration;
///
/// assert_eq!(format_duration(Some(30)), "30 dagen");
/// assert_eq!(format_duration(Some(1)), "1 dag");
/// assert_eq!(format_duration(None), "-");
/// ```
pub fn format_duration(days: Option<i64>) -> String {
    match days {
        Some(1) => "1 dag".to_string(),
        Some(d) => format!("{} dagen", d),
        None => "-".to_string(),
    }
}

/// Resolve an optional text value for display, substituting the fixed
/// unknown label for absence, never an empty string.
pub fn display_or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_LABEL,
    }
}

/// Insert `,` separators into a plain integer string.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    grouped
}

// ── Tests ─────────────────────────────────────────────────────────────────────
