//! Property loading from disk and the environment.
//!
//! Configuration is a flat set of dotted keys (`server.port`,
//! `featurehub.url-path`). A TOML file is flattened into that shape: tables
//! contribute key segments, arrays are joined with `,`. Keys missing from the
//! file fall back to environment variables.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Flat, dotted-key property set.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: BTreeMap<String, String>,
    env_fallback: bool,
}

impl Properties {
    /// Empty property set with no environment fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a property set from explicit pairs (no environment fallback).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            env_fallback: false,
        }
    }

    /// Parse TOML text into a flat property set.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let mut values = BTreeMap::new();
        flatten("", &table, &mut values);
        Ok(Self {
            values,
            env_fallback: false,
        })
    }

    /// Load a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let props = Self::from_toml_str(&content)?;
        tracing::debug!(path = ?path, keys = props.values.len(), "Properties loaded");
        Ok(props)
    }

    /// Resolve keys missing from this set against the process environment.
    pub fn with_env_fallback(mut self) -> Self {
        self.env_fallback = true;
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a key. Presence matters: an empty value is still `Some`.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.values.get(key) {
            return Some(value.clone());
        }

        if !self.env_fallback {
            return None;
        }

        std::env::var(key)
            .ok()
            .or_else(|| std::env::var(env_name(key)).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up and parse a key, reporting unparseable values.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

/// `server.gracePeriodInSeconds` -> `SERVER_GRACEPERIODINSECONDS`
fn env_name(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::Table(nested) => flatten(&full_key, nested, out),
            other => {
                out.insert(full_key, scalar_to_string(other));
            }
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_tables_and_arrays() {
        let props = Properties::from_toml_str(
            r#"
            "featurehub.url-path" = "/app"

            [server]
            port = 9000
            gracePeriodInSeconds = 3

            [jersey]
            prefixes = ["/a/*", "/b/*"]

            [run]
            nginx = true
            "#,
        )
        .unwrap();

        assert_eq!(props.get("server.port").as_deref(), Some("9000"));
        assert_eq!(props.get("server.gracePeriodInSeconds").as_deref(), Some("3"));
        assert_eq!(props.get("jersey.prefixes").as_deref(), Some("/a/*,/b/*"));
        assert_eq!(props.get("featurehub.url-path").as_deref(), Some("/app"));
        assert!(props.contains("run.nginx"));
        assert!(!props.contains("missing.key"));
    }

    #[test]
    fn test_get_parsed_reports_bad_values() {
        let props = Properties::from_pairs([("server.port", "eighty")]);
        let err = props.get_parsed::<u16>("server.port").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "server.port"));

        let props = Properties::from_pairs([("server.port", " 8080 ")]);
        assert_eq!(props.get_parsed::<u16>("server.port").unwrap(), Some(8080));
        assert_eq!(props.get_parsed::<u16>("server.other").unwrap(), None);
    }

    #[test]
    fn test_env_name() {
        assert_eq!(env_name("featurehub.url-path"), "FEATUREHUB_URL_PATH");
        assert_eq!(env_name("run.nginx"), "RUN_NGINX");
    }
}
