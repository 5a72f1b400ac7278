//! Attribute values with null, unknown and known states.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// JSON key marking a value as unknown: `{"$unknown": true}`.
pub const UNKNOWN_MARKER: &str = "$unknown";

/// A configuration or state attribute.
///
/// Missing fields and JSON `null` decode to [`Attr::Null`]. The object
/// `{"$unknown": true}` decodes to [`Attr::Unknown`]. Anything else is
/// decoded as `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr<T> {
    /// No value.
    Null,
    /// A value that is not determined yet.
    Unknown,
    /// A concrete value.
    Known(T),
}

impl<T> Default for Attr<T> {
    fn default() -> Self {
        Self::Null
    }
}

impl<T> Attr<T> {
    /// Returns true if the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is unknown.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the known value, if any.
    #[must_use]
    pub const fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Consumes the attribute, returning the known value, if any.
    #[must_use]
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Null | Self::Unknown => None,
        }
    }

    /// Maps `Some` to a known value and `None` to null.
    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }

    /// Maps the known value with `f`, keeping null and unknown as they are.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Attr<U> {
        match self {
            Self::Known(value) => Attr::Known(f(value)),
            Self::Null => Attr::Null,
            Self::Unknown => Attr::Unknown,
        }
    }

    /// Returns `self` when known, otherwise `fallback`.
    #[must_use]
    pub fn or_known(self, fallback: Self) -> Self {
        match self {
            Self::Known(_) => self,
            Self::Null | Self::Unknown => fallback,
        }
    }
}

impl Attr<String> {
    /// Wire strings use `""` for "not set"; that maps to null here.
    #[must_use]
    pub fn from_non_empty(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Null
        } else {
            Self::Known(value)
        }
    }

    /// Like [`Attr::from_non_empty`] for optional wire strings.
    #[must_use]
    pub fn from_optional(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::from_non_empty)
    }

    /// Returns the value when it is known and not empty.
    #[must_use]
    pub fn non_empty(&self) -> Option<&str> {
        match self {
            Self::Known(value) if !value.is_empty() => Some(value.as_str()),
            _ => None,
        }
    }
}

impl<T> From<T> for Attr<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Unknown => {
                let mut marker = serde_json::Map::new();
                marker.insert(UNKNOWN_MARKER.to_string(), serde_json::Value::Bool(true));
                marker.serialize(serializer)
            }
            Self::Known(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Attr<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(Self::Null);
        }
        if is_unknown_marker(&raw) {
            return Ok(Self::Unknown);
        }
        serde_json::from_value(raw).map(Self::Known).map_err(D::Error::custom)
    }
}

/// True for exactly `{"$unknown": true}`.
pub(crate) fn is_unknown_marker(raw: &serde_json::Value) -> bool {
    raw.as_object().is_some_and(|object| {
        object.len() == 1 && object.get(UNKNOWN_MARKER) == Some(&serde_json::Value::Bool(true))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Model {
        #[serde(default)]
        name: Attr<String>,
        #[serde(default)]
        tags: Attr<Vec<String>>,
        #[serde(default)]
        limit: Attr<i64>,
    }

    #[test]
    fn test_decode_states() {
        let model: Model = serde_json::from_value(json!({
            "name": "demo",
            "tags": {"$unknown": true},
        }))
        .unwrap();

        assert_eq!(model.name, Attr::Known(String::from("demo")));
        assert!(model.tags.is_unknown());
        assert!(model.limit.is_null());
    }

    #[test]
    fn test_encode_states() {
        let model = Model {
            name: Attr::Known(String::from("demo")),
            tags: Attr::Unknown,
            limit: Attr::Null,
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(
            value,
            json!({"name": "demo", "tags": {"$unknown": true}, "limit": null})
        );
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let result = serde_json::from_value::<Model>(json!({"limit": "ten"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_string_maps_to_null() {
        assert!(Attr::from_non_empty("").is_null());
        assert!(Attr::from_optional(None).is_null());
        assert_eq!(Attr::from_optional(Some("x")).non_empty(), Some("x"));
        assert_eq!(Attr::Known(String::new()).non_empty(), None);
    }

    #[test]
    fn test_or_known() {
        let planned: Attr<String> = Attr::Unknown;
        let prior = Attr::Known(String::from("kept"));
        assert_eq!(planned.or_known(prior.clone()), prior);
    }
}
