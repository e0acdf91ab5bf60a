use crate::utils::error::{Result, RpaasError};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "rpaasv2";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: String,
    pub request_timeout_seconds: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9999".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Root directory of the file backend.
    pub path: String,
    /// Tenancy namespace for every instance and plan this server touches.
    pub namespace: String,
    pub seed_plans: Vec<SeedPlan>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: "./data".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            seed_plans: Vec::new(),
        }
    }
}

/// Plan created at startup when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPlan {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: Option<String>,
}

impl ServerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RpaasError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RpaasError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有指定檔案時使用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${RPAAS_NAMESPACE})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RpaasError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind_address", &self.server.bind_address)?;
        validation::validate_positive_number(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
        )?;
        validation::validate_object_name("store.namespace", &self.store.namespace)?;

        if self.store.backend == StoreBackend::File {
            validation::validate_path("store.path", &self.store.path)?;
        }

        for plan in &self.store.seed_plans {
            validation::validate_object_name("store.seed_plans.name", &plan.name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:8080"
request_timeout_seconds = 5

[store]
backend = "file"
path = "/var/lib/rpaas"
namespace = "tenant-a"

[[store.seed_plans]]
name = "small"
description = "Small reverse proxy"

[[store.seed_plans]]
name = "bare"

[logging]
format = "json"
level = "debug"
"#;

        let config = ServerConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.store.namespace, "tenant-a");
        assert_eq!(config.store.seed_plans.len(), 2);
        assert!(config.store.seed_plans[1].description.is_empty());
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = ServerConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:9999");
        assert_eq!(config.server.request_timeout_seconds, 30);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RPAAS_TEST_NAMESPACE", "from-env");

        let toml_content = r#"
[store]
namespace = "${RPAAS_TEST_NAMESPACE}"
path = "${RPAAS_TEST_UNSET_VARIABLE}"
"#;

        let config = ServerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.namespace, "from-env");
        assert_eq!(config.store.path, "${RPAAS_TEST_UNSET_VARIABLE}");

        std::env::remove_var("RPAAS_TEST_NAMESPACE");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();
        config.server.bind_address = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.store.namespace = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = ServerConfig::from_toml_str("[store]\nbackend = \"etcd\"\n").unwrap_err();
        assert!(matches!(err, RpaasError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nnamespace = \"file-test\"\n")
            .unwrap();

        let config = ServerConfig::load(temp_file.path().to_str()).unwrap();
        assert_eq!(config.store.namespace, "file-test");
    }
}
