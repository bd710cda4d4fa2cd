use clap::Parser;
use dupelink::actions::LinkStrategy;
use dupelink::cli::Cli;
use dupelink::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "hash_buffer_size = 8192\nverify = true\n").unwrap();

    // Only this test sets this variable.
    std::env::set_var("DUPELINK_HASH_BUFFER_SIZE", "16384");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DUPELINK_").only(&["hash_buffer_size"]))
        .extract()
        .unwrap();
    std::env::remove_var("DUPELINK_HASH_BUFFER_SIZE");

    assert_eq!(config.hash_buffer_size, 16384);
    assert!(config.verify);
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupelink.toml");
    fs::write(
        &path,
        "progress_interval = 500\nignore_patterns = [\"*.tmp\"]\nmin_size = 10\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "dupelink",
        "--config",
        path.to_str().unwrap(),
        "--progress-interval",
        "25",
        "--atomic",
        "-i",
        "cache/",
        "/data",
    ])
    .unwrap();
    let config = Config::from_cli(&cli).unwrap();

    assert_eq!(config.progress_interval, 25);
    assert_eq!(config.link_strategy, LinkStrategy::LinkThenRename);
    assert_eq!(config.min_size, Some(10));
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache/"]);
}

#[test]
fn test_zero_interval_in_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupelink.toml");
    fs::write(&path, "progress_interval = 0\n").unwrap();

    let cli = Cli::try_parse_from(["dupelink", "--config", path.to_str().unwrap(), "/data"])
        .unwrap();

    assert!(matches!(
        Config::from_cli(&cli),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupelink.toml");
    fs::write(&path, "link_strategy = \"reflink\"\n").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
    assert!(err.to_string().contains("reflink"));
}

#[test]
fn test_default_path_is_named_config_toml() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("config.toml"));
    }
}
