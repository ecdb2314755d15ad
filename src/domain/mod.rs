// ==========================================
// 设备台账批量导入 - 领域模型层
// ==========================================
// 职责: 定义导入管道中的数据结构与报告模型
// 红线: 不含网络访问逻辑,不含解析逻辑
// ==========================================

pub mod device;
pub mod import_report;

// 重导出核心类型
pub use device::{DeviceCreateRequest, DeviceDefaults, DeviceField, SourceRow, ValidatedRow};
pub use import_report::{ImportReport, ImportSummary, ReportAccumulator, RowError, RowOutcome};
