//! Helpers shared by every resource and data source.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiObject, BraintrustClient, ListOptions};
use crate::error::{InputError, LookupError, ProviderError, Result};
use crate::framework::{Attr, Attribute, AttributeFlags, Schema};
use crate::reconcile::{Named, SoftDeleted, resolve_unique, resolve_unique_by};

/// Prefix shared by every resource and data source type name.
pub const TYPE_PREFIX: &str = "braintrust_";

type JsonMap = serde_json::Map<String, Value>;

// ============================================================================
// Models
// ============================================================================

/// Decodes a configuration or state object into a typed model.
pub fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        InputError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Encodes a typed model into a state object.
pub fn encode<T: Serialize>(model: &T) -> Result<Value> {
    Ok(serde_json::to_value(model)?)
}

/// A copy of `schema` where every attribute is computed.
pub fn computed_schema(schema: &Schema) -> Schema {
    let mut computed = Schema::v0();
    for (name, attr) in &schema.attributes {
        let flags = AttributeFlags {
            sensitive: attr.flags.sensitive,
            ..AttributeFlags::computed()
        };
        let mut copy = Attribute::new(attr.attr_type.clone(), flags);
        copy.description.clone_from(&attr.description);
        computed = computed.with_attribute(name.clone(), copy);
    }
    computed
}

// ============================================================================
// Input validation
// ============================================================================

/// How a singular data source locates its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    /// By id.
    Id(&'a str),
    /// By another unique-ish attribute.
    By {
        /// Attribute name, e.g. `name`.
        key: &'static str,
        /// Value to match.
        value: &'a str,
    },
}

/// Picks the single lookup key that is set among `id` and `keys`.
///
/// Empty strings count as unset. An id must be a UUID.
pub fn selector<'a>(
    id: &'a Attr<String>,
    keys: &[(&'static str, &'a Attr<String>)],
) -> Result<Selector<'a>> {
    let candidates: Vec<(&'static str, &Attr<String>)> =
        std::iter::once(("id", id)).chain(keys.iter().copied()).collect();

    if let Some((attribute, _)) = candidates.iter().find(|(_, attr)| attr.is_unknown()) {
        return Err(InputError::Unknown {
            attribute: (*attribute).to_string(),
        }
        .into());
    }

    let set: Vec<(&'static str, &'a str)> = candidates
        .iter()
        .filter_map(|(name, attr)| attr.non_empty().map(|value| (*name, value)))
        .collect();

    match set.as_slice() {
        [] => Err(InputError::ExactlyOneOf {
            attributes: candidates.iter().map(|(name, _)| (*name).to_string()).collect(),
        }
        .into()),
        [("id", value)] => {
            validate_uuid("id", value)?;
            Ok(Selector::Id(*value))
        }
        [(key, value)] => Ok(Selector::By {
            key: *key,
            value: *value,
        }),
        [(first, _), (second, _), ..] => Err(InputError::conflicting(*first, *second).into()),
    }
}

/// Fails unless `value` parses as a UUID.
pub fn validate_uuid(attribute: &str, value: &str) -> Result<()> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|e| {
            InputError::invalid(attribute, format!("\"{value}\" is not a valid UUID: {e}")).into()
        })
}

/// Validates a `limit` attribute.
///
/// Null means "no limit". Zero, negative and unrepresentable values fail.
pub fn validate_limit(limit: &Attr<i64>) -> Result<Option<usize>> {
    match limit {
        Attr::Null => Ok(None),
        Attr::Unknown => Err(InputError::Unknown {
            attribute: String::from("limit"),
        }
        .into()),
        Attr::Known(value) if *value <= 0 => {
            Err(InputError::NonPositiveLimit { value: *value }.into())
        }
        Attr::Known(value) => usize::try_from(*value)
            .map(Some)
            .map_err(|_| InputError::LimitOutOfRange { value: *value }.into()),
    }
}

/// A string filter that must be known; empty means unset.
pub fn known_filter<'a>(attribute: &str, value: &'a Attr<String>) -> Result<Option<&'a str>> {
    if value.is_unknown() {
        return Err(InputError::Unknown {
            attribute: attribute.to_string(),
        }
        .into());
    }
    Ok(value.non_empty())
}

/// An id list filter that must be known; empty means unset.
pub fn known_ids<'a>(value: &'a Attr<Vec<String>>) -> Result<Option<&'a [String]>> {
    match value {
        Attr::Unknown => Err(InputError::Unknown {
            attribute: String::from("ids"),
        }
        .into()),
        Attr::Known(ids) if !ids.is_empty() => Ok(Some(ids.as_slice())),
        Attr::Known(_) | Attr::Null => Ok(None),
    }
}

/// Fails when both attributes are set.
pub fn exclusive(first: (&str, bool), second: (&str, bool)) -> Result<()> {
    if first.1 && second.1 {
        return Err(InputError::conflicting(first.0, second.0).into());
    }
    Ok(())
}

/// A required string attribute of a planned resource.
pub fn required(attribute: &str, value: &Attr<String>) -> Result<String> {
    match value {
        Attr::Unknown => Err(InputError::Unknown {
            attribute: attribute.to_string(),
        }
        .into()),
        Attr::Known(value) if !value.is_empty() => Ok(value.clone()),
        Attr::Known(_) | Attr::Null => Err(InputError::missing(attribute).into()),
    }
}

/// An optional string attribute, `None` when null, empty or unknown.
pub fn optional(value: &Attr<String>) -> Option<String> {
    value.non_empty().map(str::to_string)
}

/// The patch value for a string attribute: `None` when unchanged.
///
/// Clearing an attribute sends an empty string.
pub fn changed_string(prior: &Attr<String>, planned: &Attr<String>) -> Option<String> {
    if planned.is_unknown() || planned.non_empty() == prior.non_empty() {
        return None;
    }
    Some(planned.non_empty().unwrap_or_default().to_string())
}

/// The patch value for any other attribute: `None` when unchanged.
pub fn changed<T: PartialEq + Clone>(prior: &Attr<T>, planned: &Attr<T>) -> Option<T> {
    match planned {
        Attr::Known(value) if prior.as_known() != Some(value) => Some(value.clone()),
        _ => None,
    }
}

// ============================================================================
// Wire conversions
// ============================================================================

/// Renders a wire timestamp.
pub fn timestamp(value: Option<&DateTime<Utc>>) -> Attr<String> {
    Attr::from_option(value.map(|at| at.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
}

/// Renders a JSON value as text, keeping `prior` when it encodes the same value.
pub fn json_text(value: Option<&Value>, prior: &Attr<String>) -> Result<Attr<String>> {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return Ok(Attr::Null);
    };
    if let Some(text) = prior.non_empty()
        && serde_json::from_str::<Value>(text).is_ok_and(|parsed| &parsed == value)
    {
        return Ok(Attr::Known(text.to_string()));
    }
    Ok(Attr::Known(serde_json::to_string(value)?))
}

/// Parses a JSON text attribute.
pub fn parse_json_text(attribute: &str, value: &Attr<String>) -> Result<Option<Value>> {
    value
        .non_empty()
        .map(|text| {
            serde_json::from_str::<Value>(text).map_err(|e| {
                ProviderError::from(InputError::invalid(attribute, format!("invalid JSON: {e}")))
            })
        })
        .transpose()
}

/// Renders wire metadata as a string map; non-string values become JSON text.
///
/// Missing and empty metadata are both null.
pub fn metadata_attr(value: Option<&JsonMap>) -> Attr<BTreeMap<String, String>> {
    let Some(map) = value.filter(|map| !map.is_empty()) else {
        return Attr::Null;
    };
    Attr::Known(
        map.iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
    )
}

/// Wire metadata for a string map attribute.
pub fn metadata_value(value: &Attr<BTreeMap<String, String>>) -> Option<JsonMap> {
    value.as_known().map(|map| {
        map.iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    })
}

/// A wire string list as an attribute; missing and empty lists are null.
pub fn string_list(value: Option<&Vec<String>>) -> Attr<Vec<String>> {
    Attr::from_option(value.filter(|items| !items.is_empty()).cloned())
}

// ============================================================================
// Remote lookups
// ============================================================================

/// Fetches a live entity by id; soft-deleted and missing entities are not found.
pub async fn find_by_id<T>(client: &BraintrustClient, id: &str, scope: &ListOptions) -> Result<T>
where
    T: ApiObject + SoftDeleted,
{
    let not_found = || LookupError::NotFound {
        kind: T::KIND,
        key: "id",
        value: id.to_string(),
    };

    match client.get_scoped::<T>(id, scope).await {
        Ok(entity) if entity.is_deleted() => {
            debug!("{} {id} is soft-deleted", T::KIND);
            Err(not_found().into())
        }
        Ok(entity) => Ok(entity),
        Err(err) if err.is_not_found() => Err(not_found().into()),
        Err(err) => Err(err),
    }
}

/// Lists every page matching `options` and selects the one entity named `name`.
pub async fn find_by_name<T>(
    client: &BraintrustClient,
    options: &ListOptions,
    name: &str,
) -> Result<T>
where
    T: ApiObject + Named,
{
    let candidates = client.list_all::<T>(options, None).await?;
    Ok(resolve_unique(T::KIND, name, candidates)?)
}

/// Like [`find_by_name`], matching on another attribute.
pub async fn find_by_key<T, F>(
    client: &BraintrustClient,
    options: &ListOptions,
    key: &'static str,
    value: &str,
    key_fn: F,
) -> Result<T>
where
    T: ApiObject + SoftDeleted,
    F: Fn(&T) -> &str,
{
    let candidates = client.list_all::<T>(options, None).await?;
    Ok(resolve_unique_by(T::KIND, key, value, candidates, key_fn)?)
}

/// Lists up to `limit` entities and drops soft-deleted ones.
pub async fn list_live<T>(
    client: &BraintrustClient,
    options: &ListOptions,
    limit: Option<usize>,
) -> Result<Vec<T>>
where
    T: ApiObject + SoftDeleted,
{
    let mut entities = client.list_all::<T>(options, limit).await?;
    entities.retain(|entity| !entity.is_deleted());
    Ok(entities)
}

/// Reads a managed entity; `None` when it is gone or soft-deleted.
pub async fn read_remote<T>(
    client: &BraintrustClient,
    id: &str,
    scope: &ListOptions,
) -> Result<Option<T>>
where
    T: ApiObject + SoftDeleted,
{
    match client.get_scoped::<T>(id, scope).await {
        Ok(entity) if entity.is_deleted() => Ok(None),
        Ok(entity) => Ok(Some(entity)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Deletes a managed entity; a missing entity counts as deleted.
pub async fn delete_remote<T: ApiObject>(client: &BraintrustClient, id: &str) -> Result<()> {
    match client.delete::<T>(id).await {
        Err(err) if err.is_not_found() => {
            debug!("{} {id} was already deleted", T::KIND);
            Ok(())
        }
        other => other,
    }
}

/// Ids of `entities`, in order.
pub fn ids_of<T: ApiObject>(entities: &[T]) -> Vec<String> {
    entities.iter().map(|entity| entity.id().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "5b9c7c1e-3f0a-4c38-9b36-5d7f5f5f8a11";

    fn known(value: &str) -> Attr<String> {
        Attr::Known(value.to_string())
    }

    #[test]
    fn test_selector_by_id() {
        let id = known(ID);
        let name = Attr::Null;
        assert_eq!(selector(&id, &[("name", &name)]).unwrap(), Selector::Id(ID));
    }

    #[test]
    fn test_selector_by_name_treats_empty_id_as_unset() {
        let id = known("");
        let name = known("demo");
        assert_eq!(
            selector(&id, &[("name", &name)]).unwrap(),
            Selector::By {
                key: "name",
                value: "demo"
            }
        );
    }

    #[test]
    fn test_selector_requires_exactly_one() {
        let id = known(ID);
        let name = known("demo");
        let err = selector(&id, &[("name", &name)]).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Input(InputError::Conflicting { .. })
        ));

        let err = selector(&Attr::Null, &[("name", &Attr::Null)]).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Input(InputError::ExactlyOneOf { .. })
        ));
    }

    #[test]
    fn test_selector_rejects_unknown_and_bad_uuid() {
        let err = selector(&Attr::Unknown, &[("name", &Attr::Null)]).unwrap_err();
        assert!(matches!(err, ProviderError::Input(InputError::Unknown { .. })));

        let err = selector(&known("nope"), &[]).unwrap_err();
        assert!(matches!(err, ProviderError::Input(InputError::Invalid { .. })));
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(&Attr::Null).unwrap(), None);
        assert_eq!(validate_limit(&Attr::Known(5)).unwrap(), Some(5));
        assert!(matches!(
            validate_limit(&Attr::Known(0)).unwrap_err(),
            ProviderError::Input(InputError::NonPositiveLimit { value: 0 })
        ));
        assert!(matches!(
            validate_limit(&Attr::Known(-3)).unwrap_err(),
            ProviderError::Input(InputError::NonPositiveLimit { value: -3 })
        ));
        assert!(validate_limit(&Attr::Unknown).is_err());
    }

    #[test]
    fn test_changed_string() {
        assert_eq!(changed_string(&known("a"), &known("a")), None);
        assert_eq!(changed_string(&known("a"), &known("b")), Some(String::from("b")));
        assert_eq!(changed_string(&known("a"), &Attr::Null), Some(String::new()));
        assert_eq!(changed_string(&Attr::Null, &known("")), None);
        assert_eq!(changed_string(&known("a"), &Attr::Unknown), None);
    }

    #[test]
    fn test_json_text_keeps_equivalent_prior() {
        let prior = known("{ \"b\": 1,  \"a\": [true] }");
        let remote = json!({"a": [true], "b": 1});
        assert_eq!(json_text(Some(&remote), &prior).unwrap(), prior);

        let changed = json_text(Some(&json!({"a": 2})), &prior).unwrap();
        assert_eq!(changed, known("{\"a\":2}"));
        assert_eq!(json_text(Some(&Value::Null), &prior).unwrap(), Attr::Null);
    }

    #[test]
    fn test_parse_json_text_reports_attribute() {
        let err = parse_json_text("prompt_data", &known("{oops")).unwrap_err();
        assert!(err.to_string().contains("prompt_data"));
        assert_eq!(parse_json_text("x", &Attr::Null).unwrap(), None);
    }

    #[test]
    fn test_metadata_round_trip_stringifies() {
        let wire = json!({"team": "ml", "tier": 2});
        let attr = metadata_attr(wire.as_object());
        let map = attr.as_known().unwrap();
        assert_eq!(map["team"], "ml");
        assert_eq!(map["tier"], "2");
        assert_eq!(metadata_value(&attr).unwrap()["team"], json!("ml"));
    }

    #[test]
    fn test_timestamp_format() {
        let at: DateTime<Utc> = "2024-05-01T12:00:00Z".parse().unwrap();
        assert_eq!(timestamp(Some(&at)), known("2024-05-01T12:00:00Z"));
        assert_eq!(timestamp(None), Attr::Null);
    }

    #[test]
    fn test_computed_schema_flags() {
        let schema = Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("secret", Attribute::optional_string().sensitive());
        let computed = computed_schema(&schema);
        assert!(computed.attributes.values().all(|a| a.flags.computed && !a.flags.optional));
        assert!(computed.attributes["secret"].flags.sensitive);
    }
}
