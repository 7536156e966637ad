//! # Validation Helpers
//!
//! Value-level validators shared by the configuration model. The structs in
//! [`crate::model`] derive `validator::Validate` and point their `custom`
//! rules at the functions here, so a declared document that reaches the
//! translator has already passed every name, range, and enumeration check.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use validator::ValidationError;

lazy_static! {
    /// Mirror session names: 2-64 characters, alphanumeric, hyphen, underscore
    static ref MIRROR_SESSION_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{2,64}$").unwrap();

    /// Policy object names: alphanumeric start, then alphanumeric, underscore, period, hyphen
    static ref OBJECT_NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,63}$").unwrap();

    /// DNS hostnames: dot-separated labels of alphanumerics and inner hyphens
    static ref HOSTNAME_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$"
    )
    .unwrap();
}

/// Rule actions accepted by the policy server
pub const RULE_ACTIONS: &[&str] = &["permit", "deny"];

/// Collector types accepted for mirror sessions
pub const COLLECTOR_TYPES: &[&str] = &["erspan_type_3"];

fn failure(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

/// Validate mirror session names
pub fn validate_mirror_session_name(name: &str) -> Result<(), ValidationError> {
    if !MIRROR_SESSION_NAME_REGEX.is_match(name) {
        return Err(failure(
            "invalid_mirror_session_name",
            format!(
                "'{}' must be 2-64 characters, only alphanumeric, hyphen and underscore allowed",
                name
            ),
        ));
    }
    Ok(())
}

/// Validate names of security policies and syslog export policies
pub fn validate_object_name(name: &str) -> Result<(), ValidationError> {
    if !OBJECT_NAME_REGEX.is_match(name) {
        return Err(failure(
            "invalid_object_name",
            format!(
                "'{}' must be 1-64 characters of alphanumeric, '_', '.', '-' starting with an alphanumeric",
                name
            ),
        ));
    }
    Ok(())
}

/// Validate a rule action
pub fn validate_rule_action(action: &str) -> Result<(), ValidationError> {
    validate_one_of("invalid_action", "action", action, RULE_ACTIONS)
}

/// Validate a mirror session collector type
pub fn validate_collector_type(collector_type: &str) -> Result<(), ValidationError> {
    validate_one_of("invalid_collector_type", "collector type", collector_type, COLLECTOR_TYPES)
}

/// Validate an export destination: an IPv4/IPv6 address or a hostname
pub fn validate_destination(destination: &str) -> Result<(), ValidationError> {
    if destination.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if destination.len() > 253 || !HOSTNAME_REGEX.is_match(destination) {
        return Err(failure(
            "invalid_destination",
            format!("'{}' must be an IP address or a hostname", destination),
        ));
    }
    Ok(())
}

/// Reject strings made only of whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(failure("blank", "must not be empty".to_string()));
    }
    Ok(())
}

/// Reject lists containing blank entries
pub fn validate_no_blank_entries(values: &[String]) -> Result<(), ValidationError> {
    if let Some(index) = values.iter().position(|v| v.trim().is_empty()) {
        return Err(failure("blank_entry", format!("entry {} must not be empty", index)));
    }
    Ok(())
}

fn validate_one_of(
    code: &'static str,
    what: &str,
    value: &str,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    if !allowed.contains(&value) {
        return Err(failure(
            code,
            format!("{} must be one of [{}], got: '{}'", what, allowed.join(", "), value),
        ));
    }
    Ok(())
}

/// Deserialize a string-keyed map, coercing scalar values (numbers, booleans)
/// to their string form. Nested values are rejected.
pub fn deserialize_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringMapVisitor;

    impl<'de> Visitor<'de> for StringMapVisitor {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of scalar values")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(BTreeMap::new())
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_map(self)
        }

        fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
                let coerced = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    serde_json::Value::Null => String::new(),
                    other => {
                        return Err(de::Error::custom(format!(
                            "value for key '{}' must be a scalar, got {}",
                            key, other
                        )))
                    }
                };
                map.insert(key, coerced);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_option(StringMapVisitor)
}

/// Deserialize a list, treating `null` as empty
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
