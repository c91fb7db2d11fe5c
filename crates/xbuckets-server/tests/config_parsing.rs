use std::{env, fs};

use clap::Parser;
use xbuckets_server::LogFormat;
use xbuckets_server::cli::Cli;
use xbuckets_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    // Create a temporary TOML configuration file
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("function-xbuckets.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9555
request_timeout_ms = 1000
body_limit_bytes = 2048
max_concurrent_requests = 8

[logging]
level = "debug"
format = "json"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 9555);
    assert_eq!(cfg.server.request_timeout_ms, 1000);
    assert_eq!(cfg.server.body_limit_bytes, 2048);
    assert_eq!(cfg.server.max_concurrent_requests, 8);
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert_eq!(cfg.logging.format, LogFormat::Json);

    // 2) Env override should win over file
    unsafe {
        env::set_var("XBUCKETS__SERVER__PORT", "9666");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9666);
    // cleanup env var
    unsafe {
        env::remove_var("XBUCKETS__SERVER__PORT");
    }

    // 3) Partial file falls back to defaults
    let partial_path = dir.path().join("partial.toml");
    fs::write(&partial_path, "[logging]\nlevel = \"warn\"\n").expect("write partial toml");
    let partial = load_config(partial_path.to_str()).expect("should parse partial config");
    assert_eq!(partial.server.port, 9443);
    assert_eq!(partial.server.max_concurrent_requests, 64);
    assert_eq!(partial.logging.level, "warn");
    assert_eq!(partial.logging.format, LogFormat::Text);

    // 4) Invalid values load, but fail validation
    let invalid_path = dir.path().join("invalid.toml");
    let invalid_toml = r#"
[server]
request_timeout_ms = 0
"#;
    fs::write(&invalid_path, invalid_toml).expect("write invalid toml");
    let loaded = load_config(invalid_path.to_str()).expect("loading does not validate");
    let err = loaded.validate().expect_err("expected validation error");
    assert!(err.contains("request_timeout_ms must be > 0"));

    // 5) Unknown log format is a deserialize error
    let bad_format_path = dir.path().join("bad_format.toml");
    fs::write(&bad_format_path, "[logging]\nformat = \"xml\"\n").expect("write toml");
    let err = load_config(bad_format_path.to_str()).expect_err("expected deserialize error");
    assert!(err.contains("config deserialize error"));

    // 6) An explicit path that does not exist is an error
    let missing = dir.path().join("missing.toml");
    let err = load_config(missing.to_str()).expect_err("expected missing file error");
    assert!(err.contains("config file not found"));
}

#[test]
fn address_flag_overrides_invalid_listen_settings_before_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("function-xbuckets.toml");
    fs::write(&path, "[server]\nhost = \"localhost\"\nport = 0\n").expect("write toml");
    let path = path.to_str().expect("utf-8 path");

    // Without --address the file's host and port are rejected
    let cli = Cli::parse_from(["function-xbuckets", "--config", path]);
    let err = cli.load_config().expect_err("expected validation error");
    assert!(err.contains("server.host"), "{err}");

    // --address replaces both before validation runs
    let cli = Cli::parse_from(["function-xbuckets", "--config", path, "--address", "127.0.0.1:9000"]);
    let cfg = cli.load_config().expect("flags should repair the listen address");
    assert_eq!(cfg.addr(), "127.0.0.1:9000".parse().unwrap());
}
