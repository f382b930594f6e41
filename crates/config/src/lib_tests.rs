// SPDX-License-Identifier: MIT

use super::*;
use std::io::Write;

fn write_cfg(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).expect("create test config file");
    f.write_all(contents.as_bytes())
        .expect("write test config file");
    path
}

const BASE_CFG: &str = r#"
PIPELINE_DIR = "/var/lib/gluetube/pipelines"
PIPELINE_SCAN_INTERVAL = "30"
SQLITE_DIR = "/var/lib/gluetube/db"
SQLITE_APP_NAME = "gluetube.db"
SQLITE_KV_NAME = "gluetube_kv.db"
SQLITE_TOKEN = "base-secret"
SOCKET_FILE = "/tmp/gluetube.sock"
PID_FILE = "/tmp/gluetube.pid"
GLUETUBE_LOG_FILE = "/var/log/gluetube.log"
"#;

#[test]
fn loads_all_recognized_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_cfg(&dir, "gluetube.cfg", BASE_CFG);

    let cfg = Config::load(&[path]).expect("config should load");
    assert_eq!(cfg.pipeline_dir, PathBuf::from("/var/lib/gluetube/pipelines"));
    assert_eq!(cfg.pipeline_scan_interval, Duration::from_secs(30));
    assert_eq!(cfg.sqlite_token, "base-secret");
    assert_eq!(cfg.http_proxy, "");
}

#[test]
fn later_location_overrides_earlier_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = write_cfg(&dir, "base.cfg", BASE_CFG);
    let override_cfg = write_cfg(
        &dir,
        "override.cfg",
        r#"SQLITE_TOKEN = "overridden-secret""#,
    );

    let cfg = Config::load(&[base, override_cfg]).expect("config should load");
    assert_eq!(cfg.sqlite_token, "overridden-secret");
    // keys not present in the override file still come from the base file
    assert_eq!(cfg.sqlite_app_name, "gluetube.db");
}

#[test]
fn missing_in_every_location_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist.cfg");
    let err = Config::load(&[missing]).expect_err("should fail to find any config file");
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[yare::parameterized(
    missing_pipeline_dir = { "PIPELINE_SCAN_INTERVAL = \"30\"" },
    missing_scan_interval = { "PIPELINE_DIR = \"/x\"" },
)]
fn missing_required_key_is_an_error(partial_cfg: &str) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_cfg(&dir, "gluetube.cfg", partial_cfg);
    let err = Config::load(&[path]).expect_err("should fail on missing key");
    assert!(matches!(err, ConfigError::MissingKey(_)));
}

#[test]
fn write_back_sqlite_token_updates_file_in_place() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_cfg(&dir, "gluetube.cfg", BASE_CFG);

    let mut cfg = Config::load(&[path.clone()]).expect("config should load");
    cfg.write_back_sqlite_token("rekeyed-secret")
        .expect("write-back should succeed");
    assert_eq!(cfg.sqlite_token, "rekeyed-secret");

    let reloaded = Config::load(&[path]).expect("config should reload");
    assert_eq!(reloaded.sqlite_token, "rekeyed-secret");
}
