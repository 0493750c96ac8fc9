//! Number formatting for dashboard metrics.

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use analytics_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by one ULP at the target precision so exact midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let grouped = group_thousands(&(rounded.trunc() as u64).to_string());

    let body = if decimals == 0 {
        grouped
    } else {
        let frac = format!(
            "{:.prec$}",
            rounded - rounded.trunc(),
            prec = decimals as usize
        );
        // `frac` is "0.xx"; keep the ".xx" part.
        format!("{}{}", grouped, &frac[1..])
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format an integer count with thousands separators (`12,345`).
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a revenue amount in dollars (`$1,234.56`).
///
/// ```
/// use analytics_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "$1,234.56");
/// assert_eq!(format_currency(0.0), "$0.00");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("$-{}", format_number(amount.abs(), 2))
    } else {
        format!("${}", format_number(amount, 2))
    }
}

/// Format a percentage that is already scaled to 0-100 (`12.34%`).
pub fn format_rate(rate: f64) -> String {
    format!("{}%", format_number(rate, 2))
}

/// Format a duration given in seconds as `"45s"` or `"3m 07s"`.
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    if total < 60 {
        format!("{}s", total)
    } else {
        format!("{}m {:02}s", total / 60, total % 60)
    }
}

/// `(part / whole) * 100`, or `0.0` when `whole` is zero.
pub fn rate_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let remainder = s.len() % 3;
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i != 0 && i % 3 == remainder {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(18_250), "18,250");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(85_123.4), "$85,123.40");
        assert_eq!(format_currency(-9.99), "$-9.99");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(41.2345), "41.23%");
        assert_eq!(format_rate(0.0), "0.00%");
        assert_eq!(format_rate(100.0), "100.00%");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0s");
        assert_eq!(format_seconds(9.6), "10s");
        assert_eq!(format_seconds(187.0), "3m 07s");
    }

    #[test]
    fn test_rate_percent_guards_zero() {
        assert_eq!(rate_percent(5, 0), 0.0);
        assert_eq!(rate_percent(0, 10), 0.0);
        assert!((rate_percent(1, 4) - 25.0).abs() < 1e-9);
        assert!((rate_percent(3, 3) - 100.0).abs() < 1e-9);
    }
}
