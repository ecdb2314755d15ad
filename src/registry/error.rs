// ==========================================
// 设备台账批量导入 - 注册服务错误类型
// ==========================================
// 说明: 这些错误只进日志；报告中只出现稳定的领域文案
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry service identity is not configured")]
    IdentityUnconfigured,

    #[error("Credential exchange rejected (HTTP {0})")]
    CredentialRejected(u16),

    #[error("Registry transport error: {0}")]
    Transport(String),

    #[error("Unexpected registry response: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl RegistryError {
    /// 身份未配置：重试无意义，本次导入内应直接失败
    pub fn is_unconfigured(&self) -> bool {
        matches!(self, RegistryError::IdentityUnconfigured)
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RegistryError::Decode(err.to_string())
        } else {
            RegistryError::Transport(err.to_string())
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
