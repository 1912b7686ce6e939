use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use minishift_core::{BuildInfo, ProfileName, DEFAULT_PROFILE_NAME, INVALID_PROFILE_NAME};

use super::*;

#[derive(Default)]
struct RecordingInstaller {
    calls: Cell<usize>,
    fail: bool,
}

impl AddonInstaller for RecordingInstaller {
    fn unpack_default_addons(&self, target_dir: &Path) -> Result<Vec<String>> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(anyhow!("bundle missing"));
        }
        fs::create_dir_all(target_dir.join("anyuid"))?;
        Ok(vec!["anyuid".to_string(), "admin-user".to_string()])
    }
}

#[derive(Default)]
struct RecordingContext {
    switched_to: RefCell<Vec<String>>,
}

impl ClusterContext for RecordingContext {
    fn use_profile(&self, profile: &ProfileName) -> Result<()> {
        self.switched_to.borrow_mut().push(profile.to_string());
        Ok(())
    }
}

fn build_info() -> BuildInfo {
    BuildInfo {
        version: "1.34.3".to_string(),
        commit: "abc1234".to_string(),
    }
}

fn named(name: &str) -> ProfileName {
    ProfileName::parse(name).expect("valid profile name")
}

#[test]
fn default_profile_layout_uses_root_directly() {
    let layout = ProfileLayout::new("/home/dev/.minishift", ProfileName::default_profile());
    assert_eq!(layout.home(), Path::new("/home/dev/.minishift"));
    assert_eq!(
        layout.config_file_path(),
        PathBuf::from("/home/dev/.minishift/config/config.json")
    );
    assert_eq!(
        layout.machine_config_path(),
        PathBuf::from("/home/dev/.minishift/machines/minishift.json")
    );
    assert_eq!(
        layout.kubeconfig_path(),
        PathBuf::from("/home/dev/.minishift/machines/minishift_kubeconfig")
    );
    assert_eq!(
        layout.update_marker_path(),
        PathBuf::from("/home/dev/.minishift/updated")
    );
}

#[test]
fn named_profile_layout_nests_under_profiles_dir() {
    let layout = ProfileLayout::new("/home/dev/.minishift", named("abc"));
    assert_eq!(layout.home(), Path::new("/home/dev/.minishift/profiles/abc"));
    assert_eq!(
        layout.config_file_path(),
        PathBuf::from("/home/dev/.minishift/profiles/abc/config/config.json")
    );
    assert_eq!(
        layout.machine_config_path(),
        PathBuf::from("/home/dev/.minishift/profiles/abc/machines/abc.json")
    );
    assert_eq!(
        layout.all_instances_config_path(),
        PathBuf::from("/home/dev/.minishift/config/allinstances.json")
    );
    assert_eq!(
        layout.default_log_dir(),
        PathBuf::from("/home/dev/.minishift/logs")
    );
}

#[test]
fn instance_dirs_are_distinct_and_under_home() {
    let layout = ProfileLayout::new("/tmp/ms", named("abc"));
    let dirs = layout.instance_dirs();
    let entries = dirs.entries();
    let mut seen = std::collections::HashSet::new();
    for (name, path) in entries {
        assert!(path.starts_with(layout.home()), "{name} escapes home");
        assert!(seen.insert(path.to_path_buf()), "{name} is duplicated");
    }
    assert_eq!(dirs.addons, layout.addons_dir());
}

#[test]
fn default_home_prefers_minishift_home_variable() {
    let env = HashMap::from([
        ("MINISHIFT_HOME".to_string(), "/data/ms".to_string()),
        ("HOME".to_string(), "/home/dev".to_string()),
    ]);
    let lookup = |key: &str| env.get(key).cloned();
    assert_eq!(
        default_minishift_home(&lookup).expect("must resolve"),
        PathBuf::from("/data/ms")
    );
}

#[cfg(not(windows))]
#[test]
fn default_home_falls_back_to_dot_minishift() {
    let env = HashMap::from([
        ("MINISHIFT_HOME".to_string(), "  ".to_string()),
        ("HOME".to_string(), "/home/dev".to_string()),
    ]);
    let lookup = |key: &str| env.get(key).cloned();
    assert_eq!(
        default_minishift_home(&lookup).expect("must resolve"),
        PathBuf::from("/home/dev/.minishift")
    );
}

#[test]
fn bootstrap_creates_tree_and_state_files() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, named("abc"));

    let outcome = bootstrap_profile(&layout, None).expect("bootstrap must succeed");

    assert!(outcome.addons_install_required);
    for (name, dir) in layout.instance_dirs().entries() {
        assert!(dir.is_dir(), "{name} was not created");
    }
    assert_eq!(
        fs::read_to_string(layout.config_file_path()).expect("must read config"),
        "{}"
    );
    assert!(layout.all_instances_config_path().exists());
    assert!(layout.machine_config_path().exists());
    assert_eq!(outcome.all_instances.active_profile(), None);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bootstrap_is_idempotent_and_keeps_existing_files() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    bootstrap_profile(&layout, None).expect("first bootstrap");

    fs::write(layout.config_file_path(), r#"{"memory": "4GB"}"#).expect("must write config");
    fs::write(
        layout.machine_config_path(),
        r#"{"OcPath": "/opt/oc", "IsRHELBased": false}"#,
    )
    .expect("must write machine config");

    let second = bootstrap_profile(&layout, None).expect("second bootstrap");

    assert!(!second.addons_install_required);
    assert_eq!(second.machine.oc_path, "/opt/oc");
    assert_eq!(
        fs::read_to_string(layout.config_file_path()).expect("must read config"),
        r#"{"memory": "4GB"}"#
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bootstrap_reuses_store_loaded_during_resolution() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");
    fs::write(&path, r#"{"ActiveProfile": "abc"}"#).expect("must seed store");
    let loaded = AllInstancesStore::load_if_present(&path)
        .expect("must load")
        .expect("store exists");

    let layout = ProfileLayout::new(&root, named("abc"));
    let outcome = bootstrap_profile(&layout, Some(loaded)).expect("bootstrap must succeed");
    assert_eq!(outcome.all_instances.active_profile(), Some("abc"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bootstrap_fails_when_a_directory_is_blocked_by_a_file() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, named("abc"));
    fs::create_dir_all(layout.home()).expect("must create home");
    fs::write(layout.certs_dir(), b"not a directory").expect("must write blocker");

    let err = bootstrap_profile(&layout, None).expect_err("bootstrap must fail");
    assert!(
        format!("{err:#}").contains("Error creating directory"),
        "unexpected error: {err:#}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn bootstrap_rejects_malformed_machine_config() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, named("abc"));
    ensure_instance_dirs(&layout.instance_dirs()).expect("must create dirs");
    fs::write(layout.machine_config_path(), "{broken").expect("must write machine config");

    let err = bootstrap_profile(&layout, None).expect_err("bootstrap must fail");
    assert!(
        err.to_string().contains("Error creating config for VM"),
        "unexpected error: {err:#}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn store_round_trips_active_profile() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");

    let mut store = AllInstancesStore::open_or_create(&path).expect("must create store");
    assert_eq!(store.active_profile(), None);
    store
        .set_active_profile(&named("qa"))
        .expect("must persist active profile");

    let reloaded = AllInstancesStore::load(&path).expect("must reload");
    assert_eq!(reloaded.active_profile(), Some("qa"));
    assert!(reloaded.is_active(&named("qa")));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn store_load_rejects_malformed_file() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");
    fs::write(&path, "[1, 2").expect("must write broken store");

    let err = AllInstancesStore::load_if_present(&path).expect_err("must fail");
    assert!(
        err.to_string().contains("invalid all instances config"),
        "unexpected error: {err:#}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn validate_rejects_non_alphanumeric_names() {
    let root = test_root();
    for requested in ["bad-name", "a_b", "x.y"] {
        let err = validate_requested_profile(&root, requested, true).expect_err("must fail");
        assert_eq!(err.to_string(), INVALID_PROFILE_NAME);
    }
}

#[test]
fn validate_rejects_missing_profile_for_other_commands() {
    let root = test_root();
    let err = validate_requested_profile(&root, "abc", false).expect_err("must fail");
    assert_eq!(
        err.to_string(),
        "Profile 'abc' doesn't exist, Use 'minishift profile set abc' or 'minishift start --profile abc' to create"
    );
}

#[test]
fn validate_allows_missing_profile_for_creating_commands() {
    let root = test_root();
    let profile = validate_requested_profile(&root, "abc", true).expect("must pass");
    assert_eq!(profile.as_str(), "abc");
}

#[test]
fn validate_accepts_existing_and_default_profiles() {
    let root = test_root();
    fs::create_dir_all(profiles_dir(&root).join("abc")).expect("must create profile");

    assert_eq!(
        validate_requested_profile(&root, "abc", false)
            .expect("existing profile")
            .as_str(),
        "abc"
    );
    assert!(validate_requested_profile(&root, DEFAULT_PROFILE_NAME, false)
        .expect("default profile")
        .is_default());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn ensure_default_active_sets_default_and_switches_context() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");
    let mut store = AllInstancesStore::open_or_create(&path).expect("must create store");
    let context = RecordingContext::default();

    let changed = ensure_default_active(&mut store, &ProfileName::default_profile(), &context)
        .expect("must succeed");

    assert!(changed);
    assert_eq!(store.active_profile(), Some(DEFAULT_PROFILE_NAME));
    assert_eq!(
        AllInstancesStore::load(&path)
            .expect("must reload")
            .active_profile(),
        Some(DEFAULT_PROFILE_NAME)
    );
    assert_eq!(*context.switched_to.borrow(), vec![DEFAULT_PROFILE_NAME]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn ensure_default_active_leaves_context_alone_for_named_profile() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");
    let mut store = AllInstancesStore::open_or_create(&path).expect("must create store");
    let context = RecordingContext::default();

    ensure_default_active(&mut store, &named("abc"), &context).expect("must succeed");

    assert_eq!(store.active_profile(), Some(DEFAULT_PROFILE_NAME));
    assert!(context.switched_to.borrow().is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn ensure_default_active_is_noop_when_profile_is_active() {
    let root = test_root();
    let path = all_instances_config_path(&root);
    ensure_parent_dir(&path).expect("must create config dir");
    let mut store = AllInstancesStore::open_or_create(&path).expect("must create store");
    store.set_active_profile(&named("abc")).expect("must set");
    let context = RecordingContext::default();

    let changed = ensure_default_active(&mut store, &ProfileName::default_profile(), &context)
        .expect("must succeed");

    assert!(!changed);
    assert_eq!(store.active_profile(), Some("abc"));
    assert!(context.switched_to.borrow().is_empty());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn post_upgrade_without_marker_is_noop() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    let installer = RecordingInstaller::default();

    let report = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("must succeed");

    assert!(report.is_none());
    assert_eq!(installer.calls.get(), 0);
}

#[test]
fn post_upgrade_without_addon_request_only_removes_marker() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    ensure_instance_dirs(&layout.instance_dirs()).expect("must create dirs");
    fs::write(
        layout.update_marker_path(),
        r#"{"PreviousVersion": "1.33.0", "InstallAddon": false}"#,
    )
    .expect("must write marker");
    let installer = RecordingInstaller::default();

    let report = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("must succeed")
    .expect("marker was present");

    assert_eq!(report.previous_version, "1.33.0");
    assert_eq!(report.current_version, "1.34.3");
    assert!(report.addons.is_none());
    assert_eq!(installer.calls.get(), 0);
    assert!(!layout.update_marker_path().exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn post_upgrade_installs_addons_once_then_becomes_noop() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, named("abc"));
    ensure_instance_dirs(&layout.instance_dirs()).expect("must create dirs");
    fs::write(
        layout.update_marker_path(),
        r#"{"PreviousVersion": "1.33.0", "InstallAddon": true}"#,
    )
    .expect("must write marker");
    let installer = RecordingInstaller::default();

    let report = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("must succeed")
    .expect("marker was present");

    assert_eq!(
        report.addons,
        Some(AddonRefresh::Installed(vec![
            "anyuid".to_string(),
            "admin-user".to_string()
        ]))
    );
    assert_eq!(installer.calls.get(), 1);
    assert!(layout.addons_dir().join("anyuid").is_dir());
    assert!(!layout.update_marker_path().exists());

    let again = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("second run must succeed");
    assert!(again.is_none());
    assert_eq!(installer.calls.get(), 1);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn post_upgrade_tolerates_malformed_marker() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    ensure_instance_dirs(&layout.instance_dirs()).expect("must create dirs");
    fs::write(layout.update_marker_path(), "not json at all").expect("must write marker");
    let installer = RecordingInstaller::default();

    let report = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("malformed marker is not an error")
    .expect("marker was present");

    assert_eq!(report.previous_version, "");
    assert!(report.addons.is_none());
    assert_eq!(installer.calls.get(), 0);
    assert!(!layout.update_marker_path().exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn post_upgrade_reports_installer_failure_and_still_removes_marker() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    ensure_instance_dirs(&layout.instance_dirs()).expect("must create dirs");
    fs::write(
        layout.update_marker_path(),
        r#"{"PreviousVersion": "1.33.0", "InstallAddon": true}"#,
    )
    .expect("must write marker");
    let installer = RecordingInstaller {
        fail: true,
        ..RecordingInstaller::default()
    };

    let report = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect("must succeed")
    .expect("marker was present");

    assert_eq!(
        report.addons,
        Some(AddonRefresh::Failed("bundle missing".to_string()))
    );
    assert!(!layout.update_marker_path().exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn post_upgrade_fails_when_marker_cannot_be_consumed() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    fs::create_dir_all(layout.update_marker_path()).expect("must create blocking dir");
    let installer = RecordingInstaller::default();

    let err = run_post_upgrade(
        &layout.update_marker_path(),
        &layout.addons_dir(),
        &installer,
        &build_info(),
    )
    .expect_err("unreadable marker must fail");
    assert!(
        err.to_string().contains("failed to read"),
        "unexpected error: {err:#}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn list_profiles_puts_default_first_and_skips_invalid_dirs() {
    let root = test_root();
    for name in ["zeta", "alpha", "not-valid"] {
        fs::create_dir_all(profiles_dir(&root).join(name)).expect("must create profile dir");
    }
    fs::write(profiles_dir(&root).join("stray"), b"").expect("must write stray file");

    let profiles = list_profiles(&root).expect("must list");
    let names: Vec<&str> = profiles.iter().map(ProfileName::as_str).collect();
    assert_eq!(names, vec![DEFAULT_PROFILE_NAME, "alpha", "zeta"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_profile_resets_active_profile_to_default() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, named("abc"));
    let outcome = bootstrap_profile(&layout, None).expect("must bootstrap");
    let mut store = outcome.all_instances;
    store.set_active_profile(&named("abc")).expect("must set");

    remove_profile(&root, &named("abc"), &mut store).expect("must remove");

    assert!(!layout.home().exists());
    assert_eq!(store.active_profile(), Some(DEFAULT_PROFILE_NAME));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn remove_profile_refuses_default_profile() {
    let root = test_root();
    let layout = ProfileLayout::new(&root, ProfileName::default_profile());
    let mut store = bootstrap_profile(&layout, None)
        .expect("must bootstrap")
        .all_instances;

    let err = remove_profile(&root, &ProfileName::default_profile(), &mut store)
        .expect_err("must refuse");
    assert!(err.to_string().contains("can not be deleted"));
    assert!(root.exists());

    let _ = fs::remove_dir_all(&root);
}

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let counter = TEST_ROOT_COUNTER.fetch_add(1, Ordering::SeqCst);
    path.push(format!(
        "minishift-profile-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    path
}
