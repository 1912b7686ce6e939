use std::fmt;

use anyhow::Result;

pub const BINARY_NAME: &str = "minishift";
pub const DEFAULT_PROFILE_NAME: &str = "minishift";
pub const ENV_PREFIX: &str = "MINISHIFT";
pub const INVALID_PROFILE_NAME: &str = "Profile names must consist of alphanumeric characters only.";

/// Name of an isolated working environment.
///
/// The default profile is exempt from the alphanumeric rule so that the
/// backward-compatible top-level layout keeps working under its reserved name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn default_profile() -> Self {
        Self(DEFAULT_PROFILE_NAME.to_string())
    }

    /// Maps an empty resolution result to the default profile.
    pub fn from_resolved(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw == DEFAULT_PROFILE_NAME {
            return Ok(Self::default_profile());
        }
        Self::parse(raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw == DEFAULT_PROFILE_NAME {
            return Ok(Self::default_profile());
        }
        if !is_valid_profile_name(raw) {
            anyhow::bail!(INVALID_PROFILE_NAME);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_PROFILE_NAME
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric())
}
