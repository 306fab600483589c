#![allow(dead_code)]

use std::sync::Arc;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use shelfclient::client::ApiClient;
use shelfclient::config::{extract_config, ApiConfig, ConfigV1};
use shelfclient::store::{MemoryStore, TokenStore};

pub const PROTECTED_PATH: &str = "/books/bookmarked/";

pub fn build_client_with_timeout(base_url: &str, timeout_in_ms: u64) -> (ApiClient, Arc<TokenStore>) {
    let tokens = Arc::new(TokenStore::load(Arc::new(MemoryStore::new())));
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_in_ms,
    };
    let client = ApiClient::new(&config, tokens.clone()).expect("failed to build client");
    (client, tokens)
}

pub fn build_client(base_url: &str) -> (ApiClient, Arc<TokenStore>) {
    build_client_with_timeout(base_url, 3_000)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// A full application config pointing at `base_url`, parsed the same way
/// the binary parses its YAML file.
pub fn load_test_config(base_url: &str, storage_yaml: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
  timeout_in_ms: 3000
toast:
  duration_in_ms: 60000
logging:
  level: "warn"
  format: "json"
{storage_yaml}
"#
    );

    extract_config(Figment::new().merge(Yaml::string(&yaml)))
        .expect("Failed to parse test config YAML")
}
