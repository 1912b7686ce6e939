use semver::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("MINISHIFT_COMMIT_SHA")
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    pub fn display_version(&self) -> String {
        format!("v{}+{}", self.version, self.commit)
    }

    /// True when `previous` is a newer release than this build.
    pub fn is_downgrade_from(&self, previous: &str) -> bool {
        let previous = previous.trim_start_matches('v');
        match (Version::parse(previous), Version::parse(&self.version)) {
            (Ok(previous), Ok(current)) => previous > current,
            _ => false,
        }
    }
}
