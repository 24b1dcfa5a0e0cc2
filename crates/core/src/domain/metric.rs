use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const NOT_DISCLOSED: &str = "Not disclosed";

/// A provider-derived figure, or the "Not disclosed" sentinel when the source had nothing.
///
/// Serializes as a bare number or as the sentinel string so downstream consumers see the same
/// shape the presentation layer always has.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metric {
    Value(f64),
    #[default]
    NotDisclosed,
}

impl Metric {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Value(v),
            _ => Self::NotDisclosed,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotDisclosed => None,
        }
    }

    pub fn is_disclosed(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::NotDisclosed => f.write_str(NOT_DISCLOSED),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => s.serialize_f64(*v),
            Self::NotDisclosed => s.serialize_str(NOT_DISCLOSED),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Repr>::deserialize(d)? {
            Some(Repr::Number(v)) => Self::from_option(Some(v)),
            Some(Repr::Text(s)) => Self::from_option(s.trim().parse::<f64>().ok()),
            None => Self::NotDisclosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_value_or_sentinel() {
        assert_eq!(serde_json::to_value(Metric::Value(1.25)).unwrap(), json!(1.25));
        assert_eq!(
            serde_json::to_value(Metric::NotDisclosed).unwrap(),
            json!("Not disclosed")
        );
    }

    #[test]
    fn deserializes_numbers_strings_and_sentinels() {
        let v: Vec<Metric> =
            serde_json::from_value(json!([3.5, "12.40", "Not disclosed", null, "N/A"])).unwrap();
        assert_eq!(
            v,
            vec![
                Metric::Value(3.5),
                Metric::Value(12.4),
                Metric::NotDisclosed,
                Metric::NotDisclosed,
                Metric::NotDisclosed,
            ]
        );
    }

    #[test]
    fn non_finite_is_not_disclosed() {
        assert_eq!(Metric::from_option(Some(f64::NAN)), Metric::NotDisclosed);
        assert_eq!(Metric::from_option(Some(f64::INFINITY)), Metric::NotDisclosed);
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(12.345_67), 12.35);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(15.0), 15.0);
    }
}
