// ==========================================
// 设备台账批量导入 - 配置层
// ==========================================
// 职责: 注册服务连接、服务身份、设备默认值
// 存储: config.toml（可被环境变量覆写）
// ==========================================

pub mod import_config;

// 重导出核心配置类型
pub use import_config::{
    env_keys, ConfigError, ImportConfig, RegistrySettings, ServiceIdentity,
};
