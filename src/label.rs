use std::fmt;

use ndarray::ArrayD;
use serde::Serialize;

use crate::data::model::MetadataValue;

/// Label value marking a record whose reference attribute is unavailable.
pub const MISSING: i64 = -1;

/// The reference label returned with a record.
///
/// Raw lookups always produce [`Label::Value`]; transforms may turn it into a
/// numeric array (e.g. one-hot encoding).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Value(MetadataValue),
    Array(#[serde(serialize_with = "serialize_array")] ArrayD<f64>),
}

impl Label {
    /// Whether this label carries the missing-label marker.
    ///
    /// For arrays every element must be the marker.
    pub fn is_missing(&self) -> bool {
        match self {
            Label::Value(v) => v.is_missing_marker(),
            Label::Array(a) => !a.is_empty() && a.iter().all(|&x| x == MISSING as f64),
        }
    }

    /// Numeric view of a scalar label.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Label::Value(v) => v.as_f64(),
            Label::Array(a) if a.len() == 1 => a.iter().next().copied(),
            Label::Array(_) => None,
        }
    }

    /// Put the missing-label marker back after a transform.
    ///
    /// Numeric scalars become `-1` and numeric arrays are filled with `-1`.
    /// Returns `false`, leaving the label untouched, when the label cannot
    /// hold the marker (text or null).
    pub fn restore_missing(&mut self) -> bool {
        match self {
            Label::Value(MetadataValue::Integer(_) | MetadataValue::Bool(_)) => {
                *self = Label::Value(MetadataValue::Integer(MISSING));
                true
            }
            Label::Value(MetadataValue::Float(v)) => {
                *v = MISSING as f64;
                true
            }
            Label::Value(MetadataValue::String(_) | MetadataValue::Null) => false,
            Label::Array(a) => {
                a.fill(MISSING as f64);
                true
            }
        }
    }
}

impl From<MetadataValue> for Label {
    fn from(v: MetadataValue) -> Self {
        Label::Value(v)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Value(v) => write!(f, "{v}"),
            Label::Array(a) => {
                let items: Vec<String> = a.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

fn serialize_array<S: serde::Serializer>(a: &ArrayD<f64>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(a.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, IxDyn};

    #[test]
    fn restore_on_numeric_scalars() {
        let mut l = Label::Value(MetadataValue::Integer(-2));
        assert!(l.restore_missing());
        assert_eq!(l, Label::Value(MetadataValue::Integer(-1)));

        let mut l = Label::Value(MetadataValue::Float(0.5));
        assert!(l.restore_missing());
        assert_eq!(l.as_f64(), Some(-1.0));
        assert!(l.is_missing());
    }

    #[test]
    fn restore_fills_arrays() {
        let mut l = Label::Array(arr1(&[0.0, 0.0, 1.0]).into_dyn());
        assert!(l.restore_missing());
        assert!(l.is_missing());
        assert_eq!(l.to_string(), "[-1, -1, -1]");
    }

    #[test]
    fn text_labels_cannot_hold_the_marker() {
        let mut l = Label::Value(MetadataValue::String("NORM".into()));
        assert!(!l.restore_missing());
        assert_eq!(l, Label::Value(MetadataValue::String("NORM".into())));
        assert!(!Label::Value(MetadataValue::Null).restore_missing());
    }

    #[test]
    fn empty_array_is_not_missing() {
        let l = Label::Array(ArrayD::zeros(IxDyn(&[0])));
        assert!(!l.is_missing());
    }

    #[test]
    fn serializes_as_plain_json() {
        let scalar = serde_json::to_string(&Label::Value(MetadataValue::Integer(1))).unwrap();
        assert_eq!(scalar, "1");
        let array = serde_json::to_string(&Label::Array(arr1(&[0.0, 1.0]).into_dyn())).unwrap();
        assert_eq!(array, "[0.0,1.0]");
    }
}
