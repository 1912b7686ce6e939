use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// The persisted per-profile settings (`config/config.json`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    values: Map<String, Value>,
}

impl ConfigDocument {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("config is not valid JSON")?;
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => anyhow::bail!("config must be a JSON object, found {}", json_kind(&other)),
        }
    }

    /// Missing or malformed files yield an empty document plus the warning to
    /// report; the invocation continues with defaults, env and flags.
    pub fn load_lenient(path: &Path) -> (Self, Option<String>) {
        let loaded = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Self::from_json_str(&content));
        match loaded {
            Ok(document) => (document, None),
            Err(err) => (
                Self::default(),
                Some(format!(
                    "Error reading config file at '{}': {err:#}",
                    path.display()
                )),
            ),
        }
    }

    /// Used when editing: an absent file is empty, a malformed one is an error.
    pub fn load_for_edit(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&self.values)
            .context("failed to serialize config")?;
        fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores `true`/`false` as booleans and integers as numbers.
    pub fn set(&mut self, key: &str, raw: &str) {
        self.values.insert(key.to_string(), typed_value(raw));
    }

    pub fn unset(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

fn typed_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(number) = raw.parse::<i64>() {
        return Value::from(number);
    }
    Value::String(raw.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
