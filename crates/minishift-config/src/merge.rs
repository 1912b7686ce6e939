use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use minishift_core::parse_bool;
use serde_json::Value;

use crate::{ConfigDocument, FlagSet};

/// Flags owned by the logging layer. Their merged values are written back
/// into the flag set on every invocation, not only when passed explicitly.
pub const LOGGING_FLAG_ALLOWLIST: [&str; 3] = ["v", "alsologtostderr", "log_dir"];

/// Where a merged value came from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    Default,
    File,
    Env,
    Flag,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::File => "file",
            Self::Env => "env",
            Self::Flag => "flag",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    pub value: Value,
    pub source: ConfigSource,
}

/// The effective key/value view for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl EffectiveConfig {
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn source(&self, key: &str) -> Option<ConfigSource> {
        self.values.get(key).map(|entry| entry.source)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|entry| match &entry.value {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        })
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(entry) = self.values.get(key) else {
            return Ok(None);
        };
        let parsed = match &entry.value {
            Value::Bool(value) => *value,
            Value::String(raw) => parse_bool(raw)
                .with_context(|| format!("invalid value for '{key}' ({})", entry.source))?,
            other => anyhow::bail!("invalid value for '{key}' ({}): {other}", entry.source),
        };
        Ok(Some(parsed))
    }

    pub fn get_u8(&self, key: &str) -> Result<Option<u8>> {
        let Some(raw) = self.get_string(key) else {
            return Ok(None);
        };
        let parsed = raw
            .trim()
            .parse::<u8>()
            .with_context(|| format!("invalid value for '{key}': expected a small integer"))?;
        Ok(Some(parsed))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    fn insert(&mut self, key: &str, value: Value, source: ConfigSource) {
        self.values
            .insert(key.to_string(), ConfigValue { value, source });
    }
}

/// `show-libmachine-logs` with prefix `MINISHIFT` reads `MINISHIFT_SHOW_LIBMACHINE_LOGS`.
pub fn env_key(prefix: &str, key: &str) -> String {
    format!("{prefix}_{}", key.replace('-', "_").to_ascii_uppercase())
}

/// Layers the four sources; later layers overwrite earlier ones:
/// registered defaults, the profile config file, prefixed environment
/// variables, then flags the user set explicitly.
pub fn merge_config(
    flags: &FlagSet,
    document: &ConfigDocument,
    env_prefix: &str,
    env_lookup: &dyn Fn(&str) -> Option<String>,
) -> EffectiveConfig {
    let mut merged = EffectiveConfig::default();

    for flag in flags.iter() {
        merged.insert(
            &flag.name,
            Value::String(flag.default.clone()),
            ConfigSource::Default,
        );
    }

    for (key, value) in document.iter() {
        merged.insert(key, value.clone(), ConfigSource::File);
    }

    let keys: Vec<String> = merged.values.keys().cloned().collect();
    for key in keys {
        if let Some(raw) = env_lookup(&env_key(env_prefix, &key)) {
            merged.insert(&key, Value::String(raw), ConfigSource::Env);
        }
    }

    for flag in flags.iter().filter(|flag| flag.changed) {
        merged.insert(&flag.name, Value::String(flag.value.clone()), ConfigSource::Flag);
    }

    merged
}

/// Writes the merged value of every allow-listed key back into its flag and
/// marks it as set, so consumers reading the flag directly agree with the
/// merged view.
pub fn sync_allowlisted_flags(
    flags: &mut FlagSet,
    merged: &mut EffectiveConfig,
    allowlist: &[&str],
) -> Result<()> {
    for name in allowlist {
        let Some(flag) = flags.get_mut(name) else {
            anyhow::bail!("flag '{name}' is not registered");
        };
        if merged.get(name).is_none() {
            merged.insert(name, Value::String(flag.default.clone()), ConfigSource::Default);
        }
        if let Some(resolved) = merged.get_string(name) {
            flag.value = resolved;
        }
        flag.changed = true;
    }
    Ok(())
}
