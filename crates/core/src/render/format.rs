use crate::domain::metric::Metric;

pub const NOT_AVAILABLE: &str = "N/A";
pub const CURRENCY_SYMBOL: &str = "$";

/// Two decimals, no separators; "N/A" for anything absent or non-numeric.
pub fn format_ratio(value: Metric) -> String {
    format_number(value.value())
}

pub fn format_number(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => fixed2(v),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}%", fixed2(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Scales to T/B/M by absolute value, always two decimals behind the currency symbol.
pub fn format_large_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let abs = v.abs();
    if abs >= 1e12 {
        format!("{CURRENCY_SYMBOL}{}T", fixed2(v / 1e12))
    } else if abs >= 1e9 {
        format!("{CURRENCY_SYMBOL}{}B", fixed2(v / 1e9))
    } else if abs >= 1e6 {
        format!("{CURRENCY_SYMBOL}{}M", fixed2(v / 1e6))
    } else {
        format!("{CURRENCY_SYMBOL}{}", fixed2(v))
    }
}

pub fn format_large_metric(value: Metric) -> String {
    format_large_currency(value.value())
}

pub fn format_price(value: f64) -> String {
    format!("{CURRENCY_SYMBOL}{}", fixed2(value))
}

fn fixed2(v: f64) -> String {
    let s = format!("{v:.2}");
    // "-0.00" reads as a sign error in a table cell.
    if s == "-0.00" {
        "0.00".to_string()
    } else {
        s
    }
}

/// Sign class of a price change: zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Positive,
    Negative,
}

impl ChangeDirection {
    pub fn classify(change: f64) -> Self {
        if change >= 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Positive => "↑",
            Self::Negative => "↓",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_currency_scales() {
        assert_eq!(format_large_currency(Some(1_500_000_000.0)), "$1.50B");
        assert_eq!(format_large_currency(Some(2_300_000_000_000.0)), "$2.30T");
        assert_eq!(format_large_currency(Some(999.0)), "$999.00");
        assert_eq!(format_large_currency(Some(12_340_000.0)), "$12.34M");
        assert_eq!(format_large_currency(Some(-4_200_000_000.0)), "$-4.20B");
        assert_eq!(format_large_currency(None), "N/A");
        assert_eq!(format_large_metric(Metric::NotDisclosed), "N/A");
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(format_ratio(Metric::Value(0.456)), "0.46");
        assert_eq!(format_ratio(Metric::Value(3.0)), "3.00");
        assert_eq!(format_ratio(Metric::NotDisclosed), "N/A");
        assert_eq!(format_number(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(Some(12.3)), "12.30%");
        assert_eq!(format_percent(None), "N/A");
        assert_eq!(format_percent(Some(-0.001)), "0.00%");
    }

    #[test]
    fn change_sign_classification() {
        assert_eq!(ChangeDirection::classify(0.0), ChangeDirection::Positive);
        assert_eq!(ChangeDirection::classify(-0.01), ChangeDirection::Negative);
        assert_eq!(ChangeDirection::classify(0.0).class_name(), "positive");
        assert_eq!(ChangeDirection::classify(-0.01).glyph(), "↓");
    }
}
