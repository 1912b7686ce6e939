use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minishift_core::{ProfileName, UPDATE_MARKER_FILE_NAME};

/// On-disk layout of one profile.
///
/// The default profile lives directly in the root so that installations
/// predating profiles keep their paths; every other profile is nested under
/// `<root>/profiles/<name>`. Construction and every accessor are pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLayout {
    root: PathBuf,
    profile: ProfileName,
    home: PathBuf,
}

/// The fixed set of directories that make up a profile's footprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDirs {
    pub home: PathBuf,
    pub certs: PathBuf,
    pub machines: PathBuf,
    pub addons: PathBuf,
    pub cache: PathBuf,
    pub iso_cache: PathBuf,
    pub oc_cache: PathBuf,
    pub image_cache: PathBuf,
    pub config: PathBuf,
    pub logs: PathBuf,
    pub tmp: PathBuf,
}

impl InstanceDirs {
    pub fn entries(&self) -> [(&'static str, &Path); 11] {
        [
            ("home", &self.home),
            ("certs", &self.certs),
            ("machines", &self.machines),
            ("addons", &self.addons),
            ("cache", &self.cache),
            ("iso-cache", &self.iso_cache),
            ("oc-cache", &self.oc_cache),
            ("image-cache", &self.image_cache),
            ("config", &self.config),
            ("logs", &self.logs),
            ("tmp", &self.tmp),
        ]
    }
}

impl ProfileLayout {
    pub fn new(root: impl Into<PathBuf>, profile: ProfileName) -> Self {
        let root = root.into();
        let home = profile_home_dir(&root, &profile);
        Self {
            root,
            profile,
            home,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profile(&self) -> &ProfileName {
        &self.profile
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn machine_name(&self) -> &str {
        self.profile.as_str()
    }

    pub fn profiles_dir(&self) -> PathBuf {
        profiles_dir(&self.root)
    }

    pub fn all_instances_config_path(&self) -> PathBuf {
        all_instances_config_path(&self.root)
    }

    pub fn default_log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn certs_dir(&self) -> PathBuf {
        self.home.join("certs")
    }

    pub fn machines_dir(&self) -> PathBuf {
        self.home.join("machines")
    }

    pub fn addons_dir(&self) -> PathBuf {
        self.home.join("addons")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    pub fn iso_cache_dir(&self) -> PathBuf {
        self.cache_dir().join("iso")
    }

    pub fn oc_cache_dir(&self) -> PathBuf {
        self.cache_dir().join("oc")
    }

    pub fn image_cache_dir(&self) -> PathBuf {
        self.cache_dir().join("images")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.home.join("tmp")
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir().join("config.json")
    }

    pub fn machine_config_path(&self) -> PathBuf {
        self.machines_dir()
            .join(format!("{}.json", self.machine_name()))
    }

    pub fn kubeconfig_path(&self) -> PathBuf {
        self.machines_dir()
            .join(format!("{}_kubeconfig", self.machine_name()))
    }

    pub fn update_marker_path(&self) -> PathBuf {
        self.home.join(UPDATE_MARKER_FILE_NAME)
    }

    pub fn instance_dirs(&self) -> InstanceDirs {
        InstanceDirs {
            home: self.home.clone(),
            certs: self.certs_dir(),
            machines: self.machines_dir(),
            addons: self.addons_dir(),
            cache: self.cache_dir(),
            iso_cache: self.iso_cache_dir(),
            oc_cache: self.oc_cache_dir(),
            image_cache: self.image_cache_dir(),
            config: self.config_dir(),
            logs: self.logs_dir(),
            tmp: self.tmp_dir(),
        }
    }
}

pub fn profiles_dir(root: &Path) -> PathBuf {
    root.join("profiles")
}

pub fn all_instances_config_path(root: &Path) -> PathBuf {
    root.join("config").join("allinstances.json")
}

pub fn profile_home_dir(root: &Path, profile: &ProfileName) -> PathBuf {
    if profile.is_default() {
        root.to_path_buf()
    } else {
        profiles_dir(root).join(profile.as_str())
    }
}

/// `MINISHIFT_HOME` wins; otherwise `~/.minishift`.
pub fn default_minishift_home(lookup: &dyn Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(home) = lookup("MINISHIFT_HOME").filter(|value| !value.trim().is_empty()) {
        return Ok(PathBuf::from(home));
    }

    if cfg!(windows) {
        let profile = lookup("USERPROFILE")
            .context("USERPROFILE is not set; cannot resolve minishift home")?;
        return Ok(PathBuf::from(profile).join(".minishift"));
    }

    let home = lookup("HOME").context("HOME is not set; cannot resolve minishift home")?;
    Ok(PathBuf::from(home).join(".minishift"))
}
