// ==========================================
// 设备台账批量导入 - API层错误类型
// ==========================================
// 职责: 汇总配置 / 注册服务初始化 / 文件读取错误
// 说明: 导入过程本身不返回错误，结论体现在 ImportReport 中
// ==========================================

use crate::config::ConfigError;
use crate::registry::RegistryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry client error: {0}")]
    Registry(#[from] RegistryError),

    #[error("File read failed ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
