//! Helpers for reading typed values out of attribute maps

use std::collections::HashMap;

use ibmvpc_client::ClientError;
use ibmvpc_core::provider::{ProviderError, ProviderResult};
use ibmvpc_core::resource::Value;

pub type Attributes = HashMap<String, Value>;

/// String attribute; absent and empty strings are both `None`
pub fn optional_string(attrs: &Attributes, key: &str) -> ProviderResult<Option<String>> {
    match attrs.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ProviderError::validation(format!(
            "Attribute '{}' must be a string, got {:?}",
            key, other
        ))),
    }
}

pub fn required_string(attrs: &Attributes, key: &str) -> ProviderResult<String> {
    optional_string(attrs, key)?
        .ok_or_else(|| ProviderError::validation(format!("Attribute '{}' is required", key)))
}

pub fn optional_bool(attrs: &Attributes, key: &str) -> ProviderResult<Option<bool>> {
    attrs
        .get(key)
        .map(|value| {
            value.as_bool().ok_or_else(|| {
                ProviderError::validation(format!(
                    "Attribute '{}' must be a bool, got {:?}",
                    key, value
                ))
            })
        })
        .transpose()
}

/// List attribute; absent lists are empty
pub fn list<'a>(attrs: &'a Attributes, key: &str) -> ProviderResult<&'a [Value]> {
    match attrs.get(key) {
        None => Ok(&[]),
        Some(Value::List(items)) => Ok(items),
        Some(other) => Err(ProviderError::validation(format!(
            "Attribute '{}' must be a list, got {:?}",
            key, other
        ))),
    }
}

/// Map attribute, or a map entry of a list attribute
pub fn as_map<'a>(value: &'a Value, context: &str) -> ProviderResult<&'a Attributes> {
    value.as_map().ok_or_else(|| {
        ProviderError::validation(format!("{} must be a map, got {:?}", context, value))
    })
}

/// Wrap a failed API call
pub fn remote_error(message: impl Into<String>, err: ClientError) -> ProviderError {
    ProviderError::remote(message, err)
}

/// Split a `"<parent>/<child>"` identifier
pub fn split_identifier(identifier: &str) -> ProviderResult<(&str, &str)> {
    match identifier.split_once('/') {
        Some((parent, child)) if !parent.is_empty() && !child.is_empty() => Ok((parent, child)),
        _ => Err(ProviderError::new(format!(
            "Invalid identifier '{}', expected '<vpc_id>/<id>'",
            identifier
        ))),
    }
}

/// Insert `value` under `key` when present
pub fn insert_opt(map: &mut Attributes, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.to_string()));
    }
}

pub fn insert_str(map: &mut Attributes, key: &str, value: &str) {
    map.insert(key.to_string(), Value::String(value.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn optional_string_treats_empty_as_absent() {
        let a = attrs(&[("x", Value::from("")), ("y", Value::from("v"))]);
        assert_eq!(optional_string(&a, "x").unwrap(), None);
        assert_eq!(optional_string(&a, "y").unwrap(), Some("v".to_string()));
        assert_eq!(optional_string(&a, "z").unwrap(), None);
    }

    #[test]
    fn type_mismatch_is_validation_error() {
        let a = attrs(&[("x", Value::Int(1))]);
        assert!(optional_string(&a, "x").unwrap_err().is_validation());
        assert!(optional_bool(&a, "x").unwrap_err().is_validation());
        assert!(list(&a, "x").unwrap_err().is_validation());
    }

    #[test]
    fn optional_bool_present_and_absent() {
        let a = attrs(&[("enable_hub", Value::Bool(true))]);
        assert_eq!(optional_bool(&a, "enable_hub").unwrap(), Some(true));
        assert_eq!(optional_bool(&a, "missing").unwrap(), None);
    }

    #[test]
    fn required_string_missing() {
        let err = required_string(&Attributes::new(), "vpc_id").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("vpc_id"));
    }

    #[test]
    fn split_identifier_parts() {
        assert_eq!(split_identifier("v1/b1").unwrap(), ("v1", "b1"));
        assert!(split_identifier("v1").is_err());
        assert!(split_identifier("/b1").is_err());
    }
}
