// ==========================================
// 设备台账批量导入 - 注册服务层
// ==========================================
// 职责: 访问凭证缓存 + 设备创建请求提交
// 依赖: 远程注册服务（令牌接口 / 设备创建接口）
// ==========================================

pub mod client;
pub mod credential;
pub mod error;
pub mod http;

// 重导出核心类型
pub use client::{
    classify_status, synthesize_serial_number, RegistryClient, CONFLICT_MESSAGE,
    CREDENTIAL_UNAVAILABLE_MESSAGE, REMOTE_FAILED_MESSAGE,
};
pub use credential::{Credential, CredentialCache, SAFETY_MARGIN_SECS};
pub use error::{RegistryError, RegistryResult};
pub use http::{HttpRegistryApi, RegistryApi, TokenGrant};
