use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StorageConfig;

/// Prefix for environment overrides, e.g. `SHELFCLIENT_API__BASE_URL`.
pub const ENV_PREFIX: &str = "SHELFCLIENT_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend location, session storage, toasts and logging.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the backend lives and how long we wait for it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

/// How long a notification stays visible.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ToastConfig {
    #[serde(default = "default_toast_duration_in_ms")]
    pub duration_in_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        ToastConfig {
            duration_in_ms: default_toast_duration_in_ms(),
        }
    }
}

fn default_toast_duration_in_ms() -> u64 {
    3_000
}

/// Extract a versioned config out of an already assembled figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from a YAML file, with `SHELFCLIENT_` environment overrides on top.
pub fn load_config(path: &str) -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    match extract_config(figment) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration from '{}': {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to render configuration schema: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileStorageConfig;

    fn parse(yaml: &str) -> Result<ConfigV1, figment::Error> {
        extract_config(Figment::new().merge(Yaml::string(yaml)))
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse("version: \"1.0.0\"\n").expect("minimal config should parse");

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_in_ms, 10_000);
        assert_eq!(config.toast.duration_in_ms, 3_000);
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_storage_config() {
        let yaml = r#"
version: "1.0.0"
api:
  base_url: "https://books.example.com/api"
  timeout_in_ms: 2500
storage:
  type: file
  path: "/tmp/session.json"
logging:
  level: debug
  format: json
"#;
        let config = parse(yaml).expect("config should parse");

        assert_eq!(config.api.base_url, "https://books.example.com/api");
        assert_eq!(config.api.timeout_in_ms, 2500);
        assert_eq!(
            config.storage,
            StorageConfig::File(FileStorageConfig {
                path: "/tmp/session.json".to_string()
            })
        );
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        assert!(parse("version: \"9.9.9\"\n").is_err());
    }

    #[test]
    fn test_unknown_storage_type_is_rejected() {
        let yaml = "version: \"1.0.0\"\nstorage:\n  type: redis\n";
        assert!(parse(yaml).is_err());
    }
}
