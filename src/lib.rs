// ==========================================
// 设备台账批量导入 - 核心库
// ==========================================
// 职责: 表格文件（CSV / Excel）批量导入设备台账，
//       逐行校验后提交至远程设备注册服务
// 定位: 尽力而为，部分成功；每行结果进入导入报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据结构与报告
pub mod domain;

// 导入层 - 解析 / 映射 / 校验 / 编排
pub mod importer;

// 注册服务层 - 凭证与提交
pub mod registry;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 上游入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, ImportApi};
pub use config::ImportConfig;
pub use domain::{ImportReport, ImportSummary, RowError, RowOutcome};
pub use importer::{DeviceImporter, DeviceImporterImpl, SourceFormat};
pub use registry::{CredentialCache, HttpRegistryApi, RegistryApi, RegistryClient};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "device-import";
