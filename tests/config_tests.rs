mod common;

use ecm_admin::config::{Config, ConfigManager, API_URL_ENV};

#[test]
fn missing_file_yields_defaults() {
    let manager = common::config_manager();
    let config = manager.load().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
    assert!(!manager.config_path().exists());
}

#[test]
fn save_then_load_keeps_values() {
    let manager = common::config_manager();
    let config = Config {
        api_base_url: "https://ecm.example/api/v1".into(),
        request_timeout_secs: 10,
        auth_token: Some("secret".into()),
    };
    manager.save(&config).unwrap();

    let reloaded = ConfigManager::new(manager.config_path().to_path_buf())
        .load()
        .unwrap();
    assert_eq!(reloaded, config);
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn corrupt_file_is_reported() {
    let manager = common::config_manager();
    std::fs::write(manager.config_path(), "{ not json").unwrap();
    let err = manager.load().unwrap_err();
    assert!(err.to_string().starts_with("Serialization error"));
}

#[test]
fn environment_overrides_base_url() {
    std::env::set_var(API_URL_ENV, "https://staging.example/api/v1");
    let config = Config::default().with_env_overrides();
    std::env::remove_var(API_URL_ENV);
    assert_eq!(config.api_base_url, "https://staging.example/api/v1");
}
