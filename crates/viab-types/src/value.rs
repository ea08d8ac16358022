use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely typed value as it arrives from stored project documents or form
/// payloads.
///
/// Objects keep their entries in document order, which matters for percentage
/// sets where the first differing key of an edit is significant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Missing or explicit `null`.
    #[default]
    Null,
    /// Boolean flag.
    Boolean(bool),
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free text, possibly a number typed by a person.
    String(String),
    /// Ordered list.
    Array(Vec<FieldValue>),
    /// Object entries in document order.
    Object(Vec<(String, FieldValue)>),
}

/// Parses a decimal typed in either Brazilian (`1.234,56`) or plain (`1234.56`)
/// notation.
///
/// When a comma is present, dots are thousands separators and the comma is the
/// decimal mark. Returns `None` for empty, unparsable or non-finite text.
///
/// Without a comma a dot is always the decimal mark: `"1.250"` is 1.25, not
/// 1250. Thousands without a decimal part must be written `"1.250,00"` or
/// `"1250"`.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<f64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = if compact.contains(',') {
        compact.replace('.', "").replace(',', ".")
    } else {
        compact
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FieldValue {
    /// Numeric view of this value. Numeric text is parsed with
    /// [`parse_decimal`]; every other variant yields `None`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Numeric view with the degrade-to-zero policy applied.
    #[must_use]
    pub fn number_or_zero(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    /// Whole-number view; floats are truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            other => other.as_f64().map(|f| f.trunc() as i64),
        }
    }

    /// Boolean view. Accepts booleans, `0`/`1` numbers and common textual
    /// spellings.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Integer(i) => Some(*i != 0),
            Self::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "on" | "yes" | "sim" | "1" => Some(true),
                "false" | "off" | "no" | "nao" | "não" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Text view of a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up an object entry by key. Non-objects have no entries.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Looks up the first present key among `keys`.
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Whether this value is `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name as a string
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON-like value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<FieldValue, E> {
        Ok(FieldValue::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FieldValue, E> {
        Ok(FieldValue::Integer(v))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FieldValue, E> {
        Ok(i64::try_from(v).map_or(FieldValue::Float(v as f64), FieldValue::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FieldValue, E> {
        Ok(FieldValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
        Ok(FieldValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
        Ok(FieldValue::String(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
        Ok(FieldValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<FieldValue, D::Error> {
        FieldValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FieldValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(FieldValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FieldValue, A::Error> {
        let mut entries: Vec<(String, FieldValue)> =
            Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, FieldValue>()? {
            // Duplicate keys: last one wins, position of the first is kept.
            if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                entries.push((key, value));
            }
        }
        Ok(FieldValue::Object(entries))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_brazilian_and_plain_decimals() {
        assert_eq!(parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal("1234.56"), Some(1234.56));
        assert_eq!(parse_decimal(" 4 500 "), Some(4500.0));
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal("1.250"), Some(1.25));
        assert_eq!(parse_decimal("1.250,00"), Some(1250.0));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn numeric_views_degrade_to_zero() {
        assert_eq!(FieldValue::Integer(3).number_or_zero(), 3.0);
        assert_eq!(FieldValue::from("7,25").number_or_zero(), 7.25);
        assert_eq!(FieldValue::from("n/a").number_or_zero(), 0.0);
        assert_eq!(FieldValue::Null.number_or_zero(), 0.0);
        assert_eq!(FieldValue::Float(f64::NAN).number_or_zero(), 0.0);
        assert_eq!(FieldValue::Boolean(true).as_f64(), None);
    }

    #[test]
    fn deserialization_preserves_object_order() {
        let value: FieldValue =
            serde_json::from_str(r#"{"zeta": 1, "alpha": {"percentual": 2.5}, "mid": [1, "x"]}"#)
                .unwrap();
        let FieldValue::Object(entries) = &value else {
            panic!("expected object, got {}", value.type_name());
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(value.get("alpha").and_then(|a| a.get("percentual")), Some(&FieldValue::Float(2.5)));
    }

    #[test]
    fn serializes_back_to_plain_json() {
        let value = FieldValue::Object(vec![
            ("b".to_string(), FieldValue::Integer(1)),
            ("a".to_string(), FieldValue::Array(vec![FieldValue::Null, FieldValue::from(true)])),
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"b":1,"a":[null,true]}"#);
    }

    #[test]
    fn textual_booleans() {
        assert_eq!(FieldValue::from("on").as_bool(), Some(true));
        assert_eq!(FieldValue::from("Não").as_bool(), Some(false));
        assert_eq!(FieldValue::Float(1.0).as_bool(), None);
    }
}
