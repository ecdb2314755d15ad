// ==========================================
// 设备台账批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 这里只包含"整批致命"的错误；
//       行级错误以 RowOutcome 形式进入导入报告
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Unsupported file format: {0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("Malformed source: {0}")]
    MalformedSource(String),

    // ===== 表头映射错误 =====
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingRequiredColumns(Vec<String>),
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::MalformedSource(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = ImportError::MissingRequiredColumns(vec![
            "Address".to_string(),
            "Place".to_string(),
        ]);
        assert_eq!(err.to_string(), "Missing required columns: Address, Place");
    }
}
