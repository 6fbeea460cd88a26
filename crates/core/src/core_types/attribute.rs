//! Polymorphic attribute values attached to ignitions, assets, and export rules.
//!
//! Import drivers (out of scope for this crate) hand the engine arbitrary
//! named attributes alongside geometry; this tagged sum type is the stable
//! representation the engine stores and round-trips, regardless of which of
//! the four variants a given driver actually produced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One polymorphic attribute value: string, 32-bit int, 64-bit int, or double.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Str(String),
    I32(i32),
    I64(i64),
    F64(f64),
}

impl AttributeValue {
    /// Best-effort numeric coercion, used when an export rule asks for a
    /// statistic-shaped attribute but the stored value came in as a string.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Str(s) => s.parse().ok(),
            AttributeValue::I32(v) => Some(f64::from(*v)),
            AttributeValue::I64(v) => Some(*v as f64),
            AttributeValue::F64(v) => Some(*v),
        }
    }
}

/// A named bag of attributes, e.g. carried on an [`crate::core_types::ignition::Ignition`] or asset geometry.
pub type AttributeSet = BTreeMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_covers_all_variants() {
        assert_eq!(AttributeValue::I32(4).as_f64(), Some(4.0));
        assert_eq!(AttributeValue::I64(8).as_f64(), Some(8.0));
        assert_eq!(AttributeValue::F64(1.5).as_f64(), Some(1.5));
        assert_eq!(AttributeValue::Str("2.5".into()).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::Str("nope".into()).as_f64(), None);
    }
}
