// ==========================================
// 设备台账批量导入 - API 层
// ==========================================
// 职责: 面向上游（上传处理 / 命令行）的导入入口
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, NO_FILE_MESSAGE};
