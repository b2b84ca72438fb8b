// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Normalizes probe endpoint lists into non-empty path sets.

use nonempty::NonEmpty;
use serde::Deserialize;

pub fn deserialize_endpoints<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    let endpoints = values
        .into_iter()
        .map(|value| normalize_endpoint(&value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)?;

    NonEmpty::from_vec(endpoints)
        .ok_or_else(|| serde::de::Error::custom("at least one health endpoint is required"))
}

/// Endpoints are paths; a missing leading slash is added.
fn normalize_endpoint(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("health endpoint cannot be empty".to_string());
    }
    if value.contains("://") {
        return Err(format!(
            "health endpoint must be a path, not a URL: {value}"
        ));
    }
    if value.starts_with('/') {
        Ok(value.to_string())
    } else {
        Ok(format!("/{value}"))
    }
}
