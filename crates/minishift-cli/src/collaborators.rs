use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use minishift_core::ProfileName;
use minishift_profile::{AddonInstaller, ClusterContext};
use tracing::debug;

use crate::render::OutputStyle;

pub(crate) const DEFAULT_ADDONS: [(&str, &str); 8] = [
    ("anyuid", "Changes the default security context constraints to allow pods to run as any user"),
    ("admin-user", "Creates a user named 'admin' with the cluster-admin role"),
    ("xpaas", "Imports xPaaS templates"),
    ("registry-route", "Creates an edge terminated route for the OpenShift registry"),
    ("che", "Deploys Eclipse Che"),
    ("htpasswd-identity-provider", "Changes the default identity provider to HTPasswdIdentityProvider"),
    ("admissions-webhook", "Enables admission webhooks"),
    ("redhat-registry-login", "Creates a secret for registry.redhat.io"),
];

/// Writes the descriptors of the add-ons that ship with the binary.
pub(crate) struct BundledAddons;

impl AddonInstaller for BundledAddons {
    fn unpack_default_addons(&self, target_dir: &Path) -> Result<Vec<String>> {
        let mut installed = Vec::with_capacity(DEFAULT_ADDONS.len());
        for (name, description) in DEFAULT_ADDONS {
            let addon_dir = target_dir.join(name);
            fs::create_dir_all(&addon_dir)
                .with_context(|| format!("failed to create {}", addon_dir.display()))?;
            let descriptor = addon_dir.join(format!("{name}.addon"));
            fs::write(
                &descriptor,
                format!("# Name: {name}\n# Description: {description}\n"),
            )
            .with_context(|| format!("failed to write {}", descriptor.display()))?;
            installed.push(name.to_string());
        }
        Ok(installed)
    }
}

/// Shows a spinner around another installer on interactive terminals.
pub(crate) struct SpinnerAddonInstaller<'a> {
    pub(crate) inner: &'a dyn AddonInstaller,
    pub(crate) style: OutputStyle,
}

impl AddonInstaller for SpinnerAddonInstaller<'_> {
    fn unpack_default_addons(&self, target_dir: &Path) -> Result<Vec<String>> {
        if self.style == OutputStyle::Plain {
            return self.inner.unpack_default_addons(target_dir);
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
            spinner.set_style(style.tick_chars("|/-\\ "));
        }
        spinner.set_message("Installing default add-ons");
        spinner.enable_steady_tick(Duration::from_millis(80));
        let result = self.inner.unpack_default_addons(target_dir);
        spinner.finish_and_clear();
        result
    }
}

/// Switches the `oc` client's current context using the client cached for
/// the profile. Without a cached client there is no context to switch.
pub(crate) struct OcClusterContext {
    pub(crate) oc_cache_dir: PathBuf,
}

impl OcClusterContext {
    fn cached_client(&self) -> Option<PathBuf> {
        let binary = if cfg!(windows) { "oc.exe" } else { "oc" };
        let direct = self.oc_cache_dir.join(binary);
        if direct.is_file() {
            return Some(direct);
        }

        let mut versions: Vec<PathBuf> = fs::read_dir(&self.oc_cache_dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|entry| entry.path().join(binary)))
            .filter(|candidate| candidate.is_file())
            .collect();
        versions.sort();
        versions.pop()
    }
}

impl ClusterContext for OcClusterContext {
    fn use_profile(&self, profile: &ProfileName) -> Result<()> {
        let Some(oc) = self.cached_client() else {
            debug!(dir = %self.oc_cache_dir.display(), "no cached oc client, skipping context switch");
            return Ok(());
        };

        let output = Command::new(&oc)
            .args(["config", "use-context", profile.as_str()])
            .output()
            .with_context(|| format!("failed to run {}", oc.display()))?;
        if !output.status.success() {
            anyhow::bail!(
                "oc config use-context {} failed: {}",
                profile,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
