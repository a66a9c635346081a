//! Layered application configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, the YAML file
//! given with `--config`, then `DOCS_SERVER__*` environment variables where
//! `__` separates nesting levels (`DOCS_SERVER__SERVER__BIND_ADDR`).

use std::path::Path;

use api_docs::ApiDocsConfig;
use docs_authn::StaticAuthNConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "DOCS_SERVER__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server, docs mounting and middleware settings.
    pub server: ApiDocsConfig,
    /// Bearer token resolution for protected routes.
    pub authn: StaticAuthNConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Plain,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration, failing if `config_path` is given but missing.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or a source fails to parse.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = config_path
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::figment(config_path)
            .extract()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use super::*;
    use docs_authn::AuthNMode;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8087");
        assert!(config.server.docs.public);
        assert_eq!(config.authn.mode, AuthNMode::AcceptAll);
        assert_eq!(config.logging.format, LogFormat::Plain);
    }

    #[test]
    fn file_overrides_defaults() {
        let file = yaml_file(
            r#"
server:
  bind_addr: "0.0.0.0:9000"
  docs:
    public: false
    docs_path: /swagger/
authn:
  mode: static_tokens
  tokens:
    - token: reader
      identity:
        subject_id: aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa
        subject_tenant_id: bbbbbbbb-bbbb-bbbb-bbbb-bbbbbbbbbbbb
        token_scopes: ["docs:read"]
logging:
  format: json
"#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert!(!config.server.docs.public);
        assert_eq!(config.server.docs.docs_path, "/swagger/");
        // Untouched nested fields keep their defaults
        assert_eq!(config.server.docs.schema_path, "/api/schema/");
        assert_eq!(config.authn.mode, AuthNMode::StaticTokens);
        assert_eq!(config.authn.tokens[0].token, "reader");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml_file("server:\n  rate_limit: 10\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
