/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use averager_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` looks like "0.50"; keep ".50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format a second count as minutes and seconds.
///
/// * under a minute → `"45 sec"`
/// * whole minutes → `"3 min"`
/// * otherwise → `"3 min 45 sec"`
///
/// Both parts are truncated, never rounded. Negative input renders the
/// magnitude with a leading `-`.
///
/// # Examples
///
/// ```
/// use averager_core::formatting::format_duration;
///
/// assert_eq!(format_duration(0.0),    "0 sec");
/// assert_eq!(format_duration(59.9),   "59 sec");
/// assert_eq!(format_duration(60.0),   "1 min");
/// assert_eq!(format_duration(125.0),  "2 min 5 sec");
/// assert_eq!(format_duration(3600.0), "60 min");
/// ```
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 {
        let magnitude = format_duration(-seconds);
        return if magnitude == "0 sec" {
            magnitude
        } else {
            format!("-{}", magnitude)
        };
    }

    let minutes = (seconds / 60.0).trunc() as u64;
    let secs = (seconds % 60.0).trunc() as u64;
    match (minutes, secs) {
        (0, s) => format!("{} sec", s),
        (m, 0) => format!("{} min", m),
        (m, s) => format!("{} min {} sec", m, s),
    }
}

/// Calculate `(part / whole) * 100`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use averager_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 1), "0.0");
    }

    #[test]
    fn test_format_number_percentages() {
        assert_eq!(format_number(100.0, 1), "100.0");
        assert_eq!(format_number(200.0 / 3.0, 1), "66.7");
        assert_eq!(format_number(100.0 / 3.0, 1), "33.3");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(12_345.0, 0), "12,345");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-1_500.25, 2), "-1,500.25");
    }

    #[test]
    fn test_format_number_negative_rounds_to_zero() {
        assert_eq!(format_number(-0.01, 1), "0.0");
    }

    // ── format_duration ──────────────────────────────────────────────────────

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(0.0), "0 sec");
        assert_eq!(format_duration(1.0), "1 sec");
        assert_eq!(format_duration(59.0), "59 sec");
    }

    #[test]
    fn test_format_duration_whole_minutes() {
        assert_eq!(format_duration(60.0), "1 min");
        assert_eq!(format_duration(120.0), "2 min");
        assert_eq!(format_duration(3600.0), "60 min");
    }

    #[test]
    fn test_format_duration_minutes_and_seconds() {
        assert_eq!(format_duration(125.0), "2 min 5 sec");
        assert_eq!(format_duration(61.0), "1 min 1 sec");
    }

    #[test]
    fn test_format_duration_truncates_fractions() {
        assert_eq!(format_duration(59.99), "59 sec");
        assert_eq!(format_duration(60.5), "1 min");
        assert_eq!(format_duration(125.9), "2 min 5 sec");
    }

    #[test]
    fn test_format_duration_negative() {
        assert_eq!(format_duration(-30.0), "-30 sec");
        assert_eq!(format_duration(-90.0), "-1 min 30 sec");
        assert_eq!(format_duration(-0.5), "0 sec");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(1.0, 4.0);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_percentage_full() {
        assert!((percentage(2.0, 2.0) - 100.0).abs() < 1e-9);
    }

    // ── group_thousands ──────────────────────────────────────────────────────

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("5"), "5");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
