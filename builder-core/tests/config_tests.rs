//! Config file loading and validation integration tests.

use assert_fs::prelude::*;
use builder_core::{
    config::{self, CleanerConfig, DEFAULT_FAILURE_THRESHOLD},
    ConfigError,
};
use predicates::prelude::predicate;
use rstest::rstest;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config::default_path_at(home.path());
    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_full_config_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("config.yaml");
    file.write_str(
        "git_home: /home/git\n\
         cleaner_poll_sleep_duration_sec: 3\n\
         failure_threshold: 4\n\
         namespaces_file: /etc/builder/namespaces.yaml\n",
    )
    .expect("write");

    let config = config::load_at(file.path()).expect("load");
    assert_eq!(config.git_home, PathBuf::from("/home/git"));
    assert_eq!(config.poll_interval_secs, 3);
    assert_eq!(config.failure_threshold, 4);
    assert_eq!(
        config.namespaces_file,
        Some(PathBuf::from("/etc/builder/namespaces.yaml"))
    );
    config.validate().expect("valid");
}

#[test]
fn omitted_fields_fall_back_to_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("config.yaml");
    file.write_str("git_home: /home/git\n").expect("write");

    let config = config::load_at(file.path()).expect("load");
    assert_eq!(config.poll_interval_secs, 1);
    assert_eq!(config.failure_threshold, DEFAULT_FAILURE_THRESHOLD);
}

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let file = home.child("config.yaml");
    file.write_str("git_home: [unclosed\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_or_default_tolerates_missing_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config = config::load_or_default_at(home.path()).expect("defaults");
    assert_eq!(config, CleanerConfig::default());
    home.child(".builder").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

#[rstest]
#[case(0, 10, "cleaner_poll_sleep_duration_sec")]
#[case(1, 0, "failure_threshold")]
fn zero_values_are_rejected(
    #[case] interval: u64,
    #[case] threshold: u32,
    #[case] field: &str,
) {
    let config = CleanerConfig {
        poll_interval_secs: interval,
        failure_threshold: threshold,
        ..CleanerConfig::new("/home/git")
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    assert!(err.to_string().contains(field), "got: {err}");
}
