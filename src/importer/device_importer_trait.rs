// ==========================================
// 设备台账批量导入 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 文件解析 → 表头映射 → 行校验 → 远程提交
// ==========================================

use crate::domain::device::SourceRow;
use crate::domain::import_report::ImportReport;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::SourceFormat;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 惰性、有限、单向的行序列
///
/// 源数据能否读取在打开时判定；行序列本身不再产生错误
pub type RowStream<'a> = Box<dyn Iterator<Item = SourceRow> + Send + 'a>;

// ==========================================
// DeviceImporter Trait
// ==========================================
// 用途: 设备批量导入主接口
// 实现者: DeviceImporterImpl
#[async_trait]
pub trait DeviceImporter: Send + Sync {
    /// 导入一份已上传的表格数据
    ///
    /// # 参数
    /// - bytes: 文件内容
    /// - format: 声明的源格式
    /// - cancel: 运行级取消令牌（仅在行与行之间生效）
    ///
    /// # 返回
    /// - ImportReport: 总是返回报告；整批致命错误体现在 summary 中
    async fn import(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        cancel: &CancellationToken,
    ) -> ImportReport;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 将字节流解析为行序列
    ///
    /// # 返回
    /// - Ok(RowStream): 行序列（含表头行）
    /// - Err: 格式无法识别 / 源数据损坏
    fn parse_rows<'a>(&self, bytes: &'a [u8]) -> ImportResult<RowStream<'a>>;
}
