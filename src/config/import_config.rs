// ==========================================
// 设备台账批量导入 - 导入配置
// ==========================================
// 存储: TOML 文件（缺省时使用内置默认配置）
// 查找顺序:
// 1. 显式指定路径
// 2. 环境变量 DEVICE_IMPORT_CONFIG
// 3. 可执行文件同目录 config.toml
// 4. <系统配置目录>/device-import/config.toml
// 5. 内置默认配置
// 覆写: DEVICE_IMPORT_REGISTRY_URL / DEVICE_IMPORT_IDENTITY / DEVICE_IMPORT_SECRET
// ==========================================

use crate::domain::device::DeviceDefaults;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// 配置键（环境变量）
pub mod env_keys {
    pub const CONFIG_PATH: &str = "DEVICE_IMPORT_CONFIG";
    pub const REGISTRY_URL: &str = "DEVICE_IMPORT_REGISTRY_URL";
    pub const IDENTITY: &str = "DEVICE_IMPORT_IDENTITY";
    pub const SECRET: &str = "DEVICE_IMPORT_SECRET";
}

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = "device-import";

/// 内置默认配置
const DEFAULT_CONFIG: &str = r#"
[registry]
base_url = "https://localhost:7062/api"
token_path = "auth/token"
devices_path = "devices"
timeout_secs = 30
token_lifetime_minutes = 20

[defaults]
work_mode_id = 1
time_zone_id = 1
status_id = 1
service_priority_id = 1
product_matrix_id = 1
country_id = 1
"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file read failed ({path}): {message}")]
    Read { path: String, message: String },

    #[error("Config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value ({key}): {message}")]
    Invalid { key: String, message: String },
}

// ==========================================
// ServiceIdentity - 注册服务的服务身份
// ==========================================
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub identity: String,
    pub secret: String,
}

impl ServiceIdentity {
    pub fn is_complete(&self) -> bool {
        !self.identity.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

// 密钥不进日志
impl std::fmt::Debug for ServiceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceIdentity")
            .field("identity", &self.identity)
            .field("secret", &"****")
            .finish()
    }
}

// ==========================================
// RegistrySettings - 注册服务连接配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub base_url: String,
    pub token_path: String,
    pub devices_path: String,
    pub timeout_secs: u64,
    /// 令牌响应未给出有效期时使用
    pub token_lifetime_minutes: i64,
    pub identity: Option<ServiceIdentity>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:7062/api".to_string(),
            token_path: "auth/token".to_string(),
            devices_path: "devices".to_string(),
            timeout_secs: 30,
            token_lifetime_minutes: 20,
            identity: None,
        }
    }
}

// ==========================================
// ImportConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub registry: RegistrySettings,
    pub defaults: DeviceDefaults,
}

impl ImportConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ImportConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// 内置默认配置
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// 按查找顺序加载配置，应用环境变量覆写并校验
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::locate(explicit) {
            Some(path) => {
                info!(path = %path.display(), "加载配置文件");
                Self::read_file(&path)?
            }
            None => {
                info!("使用内置默认配置");
                Self::embedded()?
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(env_keys::CONFIG_PATH) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let exe_candidate = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)));
        let user_candidate =
            dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));

        for candidate in [exe_candidate, user_candidate].into_iter().flatten() {
            if candidate.exists() {
                return Some(candidate);
            }
        }

        warn!("未找到 config.toml");
        None
    }

    /// 应用覆写（lookup 通常为环境变量读取）
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(env_keys::REGISTRY_URL) {
            self.registry.base_url = url;
        }

        let identity = lookup(env_keys::IDENTITY);
        let secret = lookup(env_keys::SECRET);
        if identity.is_some() || secret.is_some() {
            let current = self.registry.identity.take();
            let (cur_identity, cur_secret) = current
                .map(|c| (c.identity, c.secret))
                .unwrap_or_default();
            self.registry.identity = Some(ServiceIdentity {
                identity: identity.unwrap_or(cur_identity),
                secret: secret.unwrap_or(cur_secret),
            });
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "registry.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.registry.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "registry.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.registry.token_lifetime_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "registry.token_lifetime_minutes".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
