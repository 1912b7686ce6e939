use anyhow::Result;

/// Accepts the same spellings as Go's `strconv.ParseBool`, which is what
/// existing installations put into their environment.
pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => anyhow::bail!("invalid boolean value '{raw}'"),
    }
}

/// Reads a boolean environment variable through `lookup`; unset means false.
pub fn parse_bool_env(key: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Result<bool> {
    match lookup(key) {
        None => Ok(false),
        Some(raw) => parse_bool(raw.trim())
            .map_err(|err| anyhow::anyhow!("{key}: {err}")),
    }
}
