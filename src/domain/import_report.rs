// ==========================================
// 设备台账批量导入 - 导入报告模型
// ==========================================
// 红线: 每一行必须且只能产生一个 RowOutcome
//       success_count + error_count == total_rows
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum RowOutcome {
    Created,
    ValidationFailed(String),
    Conflict(String),
    RemoteFailed(String),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Created)
    }

    /// 失败原因（面向操作员的稳定文案）
    pub fn reason(&self) -> Option<&str> {
        match self {
            RowOutcome::Created => None,
            RowOutcome::ValidationFailed(r)
            | RowOutcome::Conflict(r)
            | RowOutcome::RemoteFailed(r) => Some(r.as_str()),
        }
    }
}

/// 报告中的一条行级错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 行号（1 起，表头为第 1 行）
    pub row_number: usize,
    pub message: String,
}

// ==========================================
// ImportSummary - 整批结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ImportSummary {
    /// 全部成功
    Clean,
    /// 部分成功，见错误列表
    Partial,
    /// 文件无数据行（非错误）
    EmptyFile,
    /// 运行被取消，报告仅包含已处理的行
    Cancelled,
    /// 整批拒绝（格式错误 / 缺少必填列），未处理任何行
    Rejected(String),
}

impl ImportSummary {
    /// 顶层提示文案
    pub fn message(&self) -> String {
        match self {
            ImportSummary::Clean => "Import completed without errors.".to_string(),
            ImportSummary::Partial => {
                "Import completed partially. See the errors below.".to_string()
            }
            ImportSummary::EmptyFile => "The file contains no data rows.".to_string(),
            ImportSummary::Cancelled => {
                "Import was cancelled. Only the rows listed were processed.".to_string()
            }
            ImportSummary::Rejected(reason) => reason.clone(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ImportSummary::Rejected(_))
    }
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub total_rows: usize,
    pub success_count: usize,
    pub errors: Vec<RowError>,
    pub summary: ImportSummary,
}

impl ImportReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 整批拒绝的报告（零行处理）
    pub fn rejected(run_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            total_rows: 0,
            success_count: 0,
            errors: Vec::new(),
            summary: ImportSummary::Rejected(reason.into()),
        }
    }
}

// ==========================================
// ReportAccumulator - 逐行折叠的累加器
// ==========================================
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    total_rows: usize,
    success_count: usize,
    errors: Vec<RowError>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一行的结果
    pub fn record(mut self, row_number: usize, outcome: RowOutcome) -> Self {
        self.total_rows += 1;
        match outcome {
            RowOutcome::Created => self.success_count += 1,
            RowOutcome::ValidationFailed(message)
            | RowOutcome::Conflict(message)
            | RowOutcome::RemoteFailed(message) => {
                self.errors.push(RowError {
                    row_number,
                    message,
                });
            }
        }
        self
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// 结束累加，按是否取消生成最终报告
    pub fn finish(self, run_id: impl Into<String>, cancelled: bool) -> ImportReport {
        let summary = if cancelled {
            ImportSummary::Cancelled
        } else if self.total_rows == 0 {
            ImportSummary::EmptyFile
        } else if self.errors.is_empty() {
            ImportSummary::Clean
        } else {
            ImportSummary::Partial
        };

        ImportReport {
            run_id: run_id.into(),
            total_rows: self.total_rows,
            success_count: self.success_count,
            errors: self.errors,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_counts_every_outcome_once() {
        let report = ReportAccumulator::new()
            .record(2, RowOutcome::Created)
            .record(3, RowOutcome::ValidationFailed("bad".to_string()))
            .record(4, RowOutcome::Conflict("dup".to_string()))
            .record(5, RowOutcome::RemoteFailed("down".to_string()))
            .record(6, RowOutcome::Created)
            .finish("run", false);

        assert_eq!(report.total_rows, 5);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count(), 3);
        assert_eq!(report.success_count + report.error_count(), report.total_rows);
        let rows: Vec<usize> = report.errors.iter().map(|e| e.row_number).collect();
        assert_eq!(rows, vec![3, 4, 5]);
        assert_eq!(report.summary, ImportSummary::Partial);
    }

    #[test]
    fn test_empty_accumulator_is_empty_file() {
        let report = ReportAccumulator::new().finish("run", false);
        assert_eq!(report.summary, ImportSummary::EmptyFile);
        assert_eq!(report.total_rows, 0);
    }

    #[test]
    fn test_cancelled_wins_over_clean() {
        let report = ReportAccumulator::new()
            .record(2, RowOutcome::Created)
            .finish("run", true);
        assert_eq!(report.summary, ImportSummary::Cancelled);
        assert_eq!(report.success_count, 1);
    }

    #[test]
    fn test_rejected_report_serializes_message() {
        let report = ImportReport::rejected("run", "Missing required columns: Address");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["status"], "rejected");
        assert_eq!(json["summary"]["message"], "Missing required columns: Address");
        assert_eq!(json["total_rows"], 0);
    }
}
