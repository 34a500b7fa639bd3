//! Human-readable number and duration formatting.

use crate::decimal::Decimal;

/// Format a number for display.
///
/// - below 1 000: fixed `decimals` places (`"12.50"`)
/// - below 1e6: integer with space thousands separators (`"12 345"`)
/// - below 1e15: two decimals with an M / B / T suffix (`"1.50 M"`)
/// - beyond: scientific with two decimals (`"1.23e15"`)
pub fn format_number(n: Decimal, decimals: usize) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if !n.is_finite() {
        return if n.is_negative() { "-∞".into() } else { "∞".into() };
    }
    if n.is_negative() {
        return format!("-{}", format_number(-n, decimals));
    }

    // Tiers are chosen on the rounded value so 999.6 prints as "1 000", not "1000".
    let value = n.to_f64();
    let places = decimals.min(15) as i32;
    if round_to(value, places) < 1_000.0 {
        return format!("{:.*}", decimals, value);
    }
    if value.round() < 1e6 {
        return group_thousands(value.round() as u64);
    }

    const SUFFIXES: [(f64, &str); 3] = [(1e9, "M"), (1e12, "B"), (1e15, "T")];
    for (limit, suffix) in SUFFIXES {
        let scaled = value / (limit / 1_000.0);
        if round_to(scaled, 2) < 1_000.0 {
            return format!("{:.2} {}", scaled, suffix);
        }
    }

    // Round the mantissa first so 9.999e20 prints as 1.00e21.
    let mut mantissa = (n.mantissa() * 100.0).round() / 100.0;
    let mut exponent = n.exponent();
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{:.2}e{}", mantissa, exponent)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(' ');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a duration in seconds (`"45s"`, `"3m 20s"`, `"2h 5m"`).
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    if total < 60 {
        return format!("{}s", total);
    }
    if total < 3_600 {
        return format!("{}m {}s", total / 60, total % 60);
    }
    format!("{}h {}m", total / 3_600, (total % 3_600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: f64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn format_small_values() {
        assert_eq!(format_number(d(0.0), 2), "0.00");
        assert_eq!(format_number(d(12.5), 2), "12.50");
        assert_eq!(format_number(d(999.0), 0), "999");
    }

    #[test]
    fn format_thousands() {
        assert_eq!(format_number(d(1_000.0), 2), "1 000");
        assert_eq!(format_number(d(123_456.0), 2), "123 456");
    }

    #[test]
    fn rounding_promotes_to_the_next_tier() {
        assert_eq!(format_number(d(999.4), 0), "999");
        assert_eq!(format_number(d(999.5), 0), "1 000");
        assert_eq!(format_number(d(999.6), 0), "1 000");
        assert_eq!(format_number(d(999.99), 2), "999.99");
        assert_eq!(format_number(d(999.996), 2), "1 000");
        assert_eq!(format_number(d(999_999.7), 0), "1.00 M");
        assert_eq!(format_number(d(999_999_999.0), 0), "1.00 B");
        assert_eq!(format_number(d(-999.6), 0), "-1 000");
    }

    #[test]
    fn format_suffixes() {
        assert_eq!(format_number(d(1_500_000.0), 2), "1.50 M");
        assert_eq!(format_number(d(2.25e9), 2), "2.25 B");
        assert_eq!(format_number(d(7e12), 2), "7.00 T");
    }

    #[test]
    fn format_scientific() {
        assert_eq!(format_number(d(1.234e15), 2), "1.23e15");
        assert_eq!(format_number(Decimal::new(5.0, 400), 2), "5.00e400");
        assert_eq!(format_number(Decimal::new(9.999, 20), 2), "1.00e21");
    }

    #[test]
    fn format_negative_and_special() {
        assert_eq!(format_number(d(-1_500.0), 2), "-1 500");
        assert_eq!(format_number(Decimal::INFINITY, 2), "∞");
    }

    #[test]
    fn format_time_ranges() {
        assert_eq!(format_time(45.7), "45s");
        assert_eq!(format_time(200.0), "3m 20s");
        assert_eq!(format_time(7_500.0), "2h 5m");
        assert_eq!(format_time(-3.0), "0s");
    }
}
