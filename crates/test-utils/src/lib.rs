//! Navigation shell test utilities.
//!
//! Fixture builders for the SDK types and assertion helpers for the JSON
//! the shell serves.

use navshell_sdk::gateway::{ProfileInfo, RouteTableEntry, ServiceInstance};
use navshell_sdk::types::{LocalizationUnit, NavigationEntry, NavigationManifest};

/// An entry routed at `/{name in lowercase}`.
pub fn test_entry(name: &str) -> NavigationEntry {
    NavigationEntry::new(name, format!("/{}", name.to_lowercase()))
}

/// A manifest with one [`test_entry`] per name, in order.
pub fn test_manifest(names: &[&str]) -> NavigationManifest {
    NavigationManifest {
        entries: names.iter().map(|n| test_entry(n)).collect(),
    }
}

/// A localization unit with one `{source}.{key}` string per language.
pub fn test_unit(source: &str, translations: &[(&str, &str, &str)]) -> LocalizationUnit {
    translations
        .iter()
        .fold(LocalizationUnit::new(source), |unit, (lang, key, value)| {
            unit.with(*lang, *key, *value)
        })
}

/// A gateway route for `service_id` with one instance.
pub fn test_route(service_id: &str, healthy: bool) -> RouteTableEntry {
    RouteTableEntry {
        path: format!("/services/{service_id}/**"),
        service_id: service_id.to_string(),
        service_instances: vec![ServiceInstance {
            instance_id: Some(format!("{service_id}-1")),
            uri: format!("http://{service_id}:8081"),
            secure: false,
            status: Some(if healthy { "UP" } else { "DOWN" }.to_string()),
            metadata: Default::default(),
        }],
    }
}

/// Profile flags with the given active profiles.
pub fn test_profile(profiles: &[&str]) -> ProfileInfo {
    ProfileInfo {
        active_profiles: profiles.iter().map(|p| p.to_string()).collect(),
    }
}

/// Assertion helpers for JSON responses.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Names of the rendered entries of a navigation response, in order.
    pub fn entry_names(navigation: &Value) -> Vec<String> {
        navigation["entries"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}
