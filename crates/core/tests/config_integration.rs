//! neutron-bench.toml integration tests
//!
//! - example config parsing
//! - file loading with tempfile
//! - environment override precedence
//! - task file loading

use std::fs;

use neutron_bench_core::config::BenchConfig;
use neutron_bench_core::error::{BenchError, ConfigError};
use neutron_bench_core::task::TaskFile;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn example_config_parses_and_validates() {
    let content = include_str!("../../../neutron-bench.toml.example");
    let config = BenchConfig::parse(content).expect("example config should parse");
    config.validate().expect("example config should validate");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.openstack.region_name, "RegionOne");
    assert_eq!(config.openstack.endpoint_type, "public");
    assert!(config.openstack.network_endpoint.is_empty());

    let admin = config.openstack.admin.as_ref().expect("admin configured");
    assert_eq!(admin.project_name, "admin");
    assert_eq!(config.openstack.users.len(), 2);
    assert_eq!(config.openstack.users[1].project_name, "bench-project-2");
    assert_eq!(config.openstack.users[1].user_domain_name, "Default");
}

#[test]
fn example_task_file_parses_and_validates() {
    let content = include_str!("../../../tasks/bgpvpn.toml");
    let task = TaskFile::parse(content).expect("task should parse");
    task.validate().expect("task should validate");
    assert_eq!(task.workloads.len(), 5);
    assert!(
        task.workloads
            .iter()
            .all(|w| w.scenario.starts_with("NeutronBGPVPN."))
    );
    assert_eq!(task.workloads[2].args["update_name"], true);
}

#[tokio::test]
#[serial]
async fn load_from_file_applies_env_overrides() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("neutron-bench.toml");
    fs::write(
        &path,
        r#"
[openstack]
auth_url = "https://file:5000/v3"
endpoint_type = "internal"
"#,
    )
    .expect("write config");

    // SAFETY: serialized test, no other thread reads the environment.
    unsafe { std::env::set_var("NEUTRON_BENCH_OPENSTACK_ENDPOINT_TYPE", "admin") };
    let config = BenchConfig::load(&path).await;
    unsafe { std::env::remove_var("NEUTRON_BENCH_OPENSTACK_ENDPOINT_TYPE") };

    let config = config.expect("config should load");
    assert_eq!(config.openstack.auth_url, "https://file:5000/v3");
    assert_eq!(config.openstack.endpoint_type, "admin");
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_env_override() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("neutron-bench.toml");
    fs::write(&path, "").expect("write config");

    // SAFETY: serialized test, no other thread reads the environment.
    unsafe { std::env::set_var("NEUTRON_BENCH_GENERAL_LOG_FORMAT", "xml") };
    let result = BenchConfig::load(&path).await;
    unsafe { std::env::remove_var("NEUTRON_BENCH_GENERAL_LOG_FORMAT") };

    let err = result.expect_err("xml log format must be rejected");
    assert!(err.to_string().contains("log_format"));
}

#[tokio::test]
async fn load_malformed_file_is_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[openstack\nauth_url = 1").expect("write config");

    let err = BenchConfig::from_file(&path).await.expect_err("must fail");
    assert!(matches!(
        err,
        BenchError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[tokio::test]
async fn task_load_missing_file_is_not_found() {
    let err = TaskFile::load("/nonexistent/task.toml")
        .await
        .expect_err("must fail");
    assert!(matches!(
        err,
        BenchError::Config(ConfigError::FileNotFound { .. })
    ));
}
