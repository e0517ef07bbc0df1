use super::*;

#[test]
fn defaults_match_reference_cadences() {
    let config = ConsoleConfig::default();
    assert_eq!(config.transport, TransportMode::Push);
    assert_eq!(config.reconnect_delay, Duration::from_millis(2000));
    assert_eq!(config.poll.logs, Duration::from_millis(600));
    assert_eq!(config.poll.progress, Duration::from_millis(5000));
    assert_eq!(config.poll.state, Duration::from_millis(500));
    assert_eq!(config.slider_debounce, Duration::from_millis(150));
    assert_eq!(config.near_bottom_rows, 5);
}

#[test]
fn file_values_override_defaults() {
    let config = ConsoleConfig::from_toml_str(
        r#"
backend_url = "http://10.0.0.5:9000"
transport = "pull"
reconnect_delay_ms = 500

[poll]
state_ms = 250
"#,
    )
    .expect("parse config");
    assert_eq!(config.backend_url, "http://10.0.0.5:9000");
    assert_eq!(config.transport, TransportMode::Pull);
    assert_eq!(config.reconnect_delay, Duration::from_millis(500));
    assert_eq!(config.poll.state, Duration::from_millis(250));
    assert_eq!(config.poll.logs, Duration::from_millis(600));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ConsoleConfig::from_toml_str("colour = \"red\"\n").expect_err("unknown key");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn zero_cadence_is_invalid() {
    let err = ConsoleConfig::from_toml_str("[poll]\nlogs_ms = 0\n").expect_err("zero");
    assert_eq!(
        err.to_string(),
        "invalid value for `poll.logs_ms`: must be greater than zero"
    );
}

#[test]
fn env_then_overrides_take_precedence() {
    let mut config = ConsoleConfig::default();
    config
        .apply_env(|key| match key {
            BACKEND_URL_ENV => Some("http://env:1".to_owned()),
            TRANSPORT_ENV => Some("poll".to_owned()),
            _ => None,
        })
        .expect("env");
    assert_eq!(config.backend_url, "http://env:1");
    assert_eq!(config.transport, TransportMode::Pull);

    config.apply_overrides(&ConfigOverrides {
        backend_url: Some("http://flag:2".to_owned()),
        transport: Some(TransportMode::Push),
        config_path: None,
    });
    assert_eq!(config.backend_url, "http://flag:2");
    assert_eq!(config.transport, TransportMode::Push);
}

#[test]
fn invalid_transport_in_env_is_reported() {
    let mut config = ConsoleConfig::default();
    let err = config
        .apply_env(|key| (key == TRANSPORT_ENV).then(|| "carrier-pigeon".to_owned()))
        .expect_err("invalid transport");
    assert!(err.to_string().contains("carrier-pigeon"));
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let err = ConsoleConfig::resolve(&ConfigOverrides {
        config_path: Some(PathBuf::from("/definitely/not/here/scape-console.toml")),
        ..ConfigOverrides::default()
    })
    .expect_err("missing file");
    assert!(matches!(err, ConfigError::Read { .. }));
}
