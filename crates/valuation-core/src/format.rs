//! Display helpers for dashboard numbers.
//!
//! Every helper accepts any `f64` and renders non-finite input as `N/A`, so
//! callers can pass projection outputs straight through without checks.

const NOT_AVAILABLE: &str = "N/A";

/// Render a large amount with a magnitude suffix: `1340000000.0` -> `1.34B`.
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (abs / 1e12, "T")
    } else if abs >= 1e9 {
        (abs / 1e9, "B")
    } else if abs >= 1e6 {
        (abs / 1e6, "M")
    } else if abs >= 1e3 {
        (abs / 1e3, "K")
    } else {
        (abs, "")
    };
    format!("{}{:.2}{}", sign, scaled, suffix)
}

/// Dollar amount with two decimals: `17.4` -> `$17.40`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

/// Compact dollar amount: `1474000000.0` -> `$1.47B`.
pub fn format_compact_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let compact = format_compact(value.abs());
    if value < 0.0 {
        format!("-${}", compact)
    } else {
        format!("${}", compact)
    }
}

/// Value already expressed in percent: `12.5` -> `12.50%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

/// Valuation multiple: `20.0` -> `20.0x`.
pub fn format_multiple(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}x", value)
}

/// Apply `formatter` to a present value, otherwise `N/A`.
pub fn format_optional(value: Option<f64>, formatter: fn(f64) -> String) -> String {
    value.map(formatter).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(1_340_000_000.0), "1.34B");
        assert_eq!(format_compact(2_500_000_000_000.0), "2.50T");
        assert_eq!(format_compact(1_500_000.0), "1.50M");
        assert_eq!(format_compact(12_346.0), "12.35K");
        assert_eq!(format_compact(999.5), "999.50");
        assert_eq!(format_compact(-4_200_000.0), "-4.20M");
        assert_eq!(format_compact(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(17.4), "$17.40");
        assert_eq!(format_currency(-3.0), "-$3.00");
        assert_eq!(format_compact_currency(1_474_000_000.0), "$1.47B");
        assert_eq!(format_compact_currency(-2_000.0), "-$2.00K");
    }

    #[test]
    fn test_format_percent_and_multiple() {
        assert_eq!(format_percent(12.5), "12.50%");
        assert_eq!(format_percent(f64::INFINITY), "N/A");
        assert_eq!(format_multiple(20.0), "20.0x");
        assert_eq!(format_optional(None, format_percent), "N/A");
        assert_eq!(format_optional(Some(3.0), format_multiple), "3.0x");
    }
}
