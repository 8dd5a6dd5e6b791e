//! Application configuration: YAML file plus `CAS_CONSUMER__*` overrides.

use std::path::Path;

use anyhow::{Context, bail};
use cas_consumer::CasConsumerConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use static_user_store_plugin::StaticUserStorePluginConfig;

/// Prefix of environment variables overriding `cas_consumer` settings,
/// e.g. `CAS_CONSUMER__PROTOCOL=2`.
pub const ENV_PREFIX: &str = "CAS_CONSUMER__";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub cas_consumer: CasConsumerConfig,

    #[serde(default)]
    pub static_user_store: StaticUserStorePluginConfig,
}

/// Load configuration from `path` (if given) and the environment.
///
/// # Errors
///
/// If the file does not exist or the merged configuration does not
/// deserialize.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    let env = Env::prefixed(ENV_PREFIX)
        .split("__")
        .map(|key| format!("cas_consumer.{key}").into());

    figment
        .merge(env)
        .extract()
        .context("invalid cas-validate configuration")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_file() {
        let file = write_yaml(
            r#"
cas_consumer:
  server_url: "https://cas.example.com"
  protocol: 2
  request_timeout: "3s"
  extra_validation_params:
    renew: "true"
static_user_store:
  users:
    - username: "foo"
"#,
        );

        let cfg = load(Some(file.path())).unwrap();

        assert_eq!(cfg.cas_consumer.protocol, 2);
        assert_eq!(cfg.cas_consumer.request_timeout, Duration::from_secs(3));
        assert_eq!(
            cfg.cas_consumer.extra_validation_params.get("renew").map(String::as_str),
            Some("true")
        );
        assert_eq!(cfg.static_user_store.users.len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/cas-validate.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn unknown_consumer_keys_are_rejected() {
        let file = write_yaml(
            r#"
cas_consumer:
  server_url: "https://cas.example.com"
  request_timeout: "3s"
  proxy_callback: "https://app.example.com/pgt"
"#,
        );

        assert!(load(Some(file.path())).is_err());
    }
}
