use std::collections::BTreeMap;

use anyhow::Result;

/// A command-line flag as seen by the merger: its registered default, the
/// current value and whether the user set it explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagValue {
    pub name: String,
    pub default: String,
    pub value: String,
    pub changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: BTreeMap<String, FlagValue>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, default: impl Into<String>) {
        let default = default.into();
        self.flags.insert(
            name.to_string(),
            FlagValue {
                name: name.to_string(),
                value: default.clone(),
                default,
                changed: false,
            },
        );
    }

    pub fn set_from_command_line(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let Some(flag) = self.flags.get_mut(name) else {
            anyhow::bail!("unknown flag '{name}'");
        };
        flag.value = value.into();
        flag.changed = true;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(|flag| flag.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagValue> {
        self.flags.values()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FlagValue> {
        self.flags.get_mut(name)
    }
}
