// ==========================================
// 设备台账批量导入 - 导入层
// ==========================================
// 职责: 外部表格数据 → 设备注册服务
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod device_importer_impl;
pub mod device_importer_trait;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod row_validator;

// 重导出核心类型
pub use device_importer_impl::{DeviceImporterImpl, ImportPhase, RunContext};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnMap, ColumnMapper};
pub use file_parser::{CsvParser, ExcelParser, SourceFormat, UniversalFileParser};
pub use row_validator::{DedupSets, RowValidationError, RowValidator};

// 重导出 Trait 接口
pub use device_importer_trait::{DeviceImporter, FileParser, RowStream};
