use std::io::Write;

use exchange_bridge::error::{ConfigError, Error};
use exchange_bridge::infrastructure::config::logging::LogFormat;
use exchange_bridge::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn full_config_loads() {
    let toml = r#"
[logging]
level = "debug"
format = "json"

[latoken]
api_url = "https://api.latoken.com"
metadata_path = "metadata/latoken.json"

[latoken.http]
timeout_ms = 3000
retry_max_attempts = 2

[gateio]
ws_url = "wss://api.gateio.ws/ws/v4/"
update_interval = "20ms"

[gateio.stream]
depth = 20
channel_capacity = 256

[gateio.stream.reconnection]
initial_delay_ms = 500
max_delay_ms = 30000
max_consecutive_failures = 5
"#;

    let file = write_temp_config(toml);
    let config = Config::load(file.path()).expect("config loads");

    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.latoken.http.timeout_ms, 3000);
    assert_eq!(config.latoken.http.retry_max_attempts, 2);
    assert_eq!(config.latoken.metadata_path.as_deref(), Some("metadata/latoken.json"));
    assert_eq!(config.gateio.update_interval, "20ms");
    assert_eq!(config.gateio.stream.depth, 20);
    assert_eq!(config.gateio.stream.reconnection.max_consecutive_failures, 5);
    assert_eq!(config.gateio.stream.reconnection.backoff_multiplier, 2.0);
}

#[test]
fn config_rejects_shrinking_backoff() {
    let toml = r#"
[gateio.stream.reconnection]
backoff_multiplier = 0.5
"#;

    let file = write_temp_config(toml);
    let result = Config::load(file.path());

    match result {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "backoff_multiplier",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid backoff error, got {err}"),
        Ok(config) => panic!(
            "Expected backoff multiplier to be rejected, got {}",
            config.gateio.stream.reconnection.backoff_multiplier
        ),
    }
}

#[test]
fn config_rejects_missing_gateio_url() {
    let toml = r#"
[gateio]
ws_url = ""
"#;

    let file = write_temp_config(toml);
    let result = Config::load(file.path());

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField { field: "gateio.ws_url" }))
    ));
}

#[test]
fn config_rejects_unknown_log_format() {
    let toml = r#"
[logging]
format = "xml"
"#;

    let file = write_temp_config(toml);
    let result = Config::load(file.path());

    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/nonexistent/exchange-bridge.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn credentials_are_never_read_from_file() {
    let toml = r#"
[latoken]
credentials = { api_key = "file-key", api_secret = "file-secret" }
"#;

    let config = Config::parse_toml_with(toml, |_| None).expect("config parses");
    assert!(config.latoken.credentials.is_none());
}
