// ==========================================
// 设备台账批量导入 - 文件解析器实现
// ==========================================
// 阶段 0: 字节流 → 行序列
// 支持: CSV（; 或 , 分隔） / Excel（.xlsx/.xls/.xlsb/.ods）
// 说明: 只做形状提取，不做内容校验
// ==========================================

use crate::domain::device::SourceRow;
use crate::importer::device_importer_trait::{FileParser, RowStream};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::error;

const BOM: char = '\u{FEFF}';

// ==========================================
// SourceFormat - 声明的源格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// 根据扩展名判断格式（大小写不敏感）
    pub fn from_extension(ext: &str) -> ImportResult<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "csv" | "txt" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }

    /// 根据文件名判断格式
    pub fn from_file_name(file_name: &str) -> ImportResult<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 探测分隔符：首个非空行含分号则用分号，否则用逗号
    ///
    /// 空行在行序列中被跳过，探测时同样跳过，保证与表头行一致
    fn detect_delimiter(bytes: &[u8]) -> u8 {
        let first_line = bytes
            .split(|b| *b == b'\n')
            .find(|line| !line.iter().all(|b| b.is_ascii_whitespace()))
            .unwrap_or(&[]);
        if first_line.contains(&b';') {
            b';'
        } else {
            b','
        }
    }

    fn record_to_row(record: &ByteRecord, is_first: bool) -> SourceRow {
        let line_number = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();

        let cells = record
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let decoded = String::from_utf8_lossy(raw);
                let mut value: &str = &decoded;
                if is_first && idx == 0 {
                    value = value.trim_start_matches(BOM);
                }
                value.trim().to_string()
            })
            .collect();

        SourceRow::new(line_number, cells)
    }
}

impl FileParser for CsvParser {
    fn parse_rows<'a>(&self, bytes: &'a [u8]) -> ImportResult<RowStream<'a>> {
        let delimiter = Self::detect_delimiter(bytes);

        let reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut first = true;
        let rows = reader
            .into_byte_records()
            // 内存字节 + flexible + 字节记录：读取不会失败；万一失败则在此截断
            .map_while(|result| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    error!(error = %e, "CSV 读取中断");
                    None
                }
            })
            .map(move |record| {
                let is_first = std::mem::replace(&mut first, false);
                Self::record_to_row(&record, is_first)
            })
            // 跳过完全空白的行
            .filter(|row| !row.is_blank());

        Ok(Box::new(rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 将工作表区域转换为行序列
    ///
    /// 行号取工作表中的绝对行号（1 起），与 Excel 界面一致
    pub fn rows_from_range(range: &Range<Data>) -> Vec<SourceRow> {
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        range
            .rows()
            .enumerate()
            .map(|(idx, cells)| {
                let cells = cells
                    .iter()
                    .map(|cell| cell.to_string().trim().trim_matches(BOM).trim().to_string())
                    .collect();
                SourceRow::new(start_row + idx + 1, cells)
            })
            .filter(|row| !row.is_blank())
            .collect()
    }
}

impl FileParser for ExcelParser {
    fn parse_rows<'a>(&self, bytes: &'a [u8]) -> ImportResult<RowStream<'a>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        // 取第一个有数据的工作表
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            let rows = Self::rows_from_range(&range);
            if !rows.is_empty() {
                return Ok(Box::new(rows.into_iter()));
            }
        }

        Ok(Box::new(std::iter::empty()))
    }
}

// ==========================================
// 通用文件解析器（根据声明格式选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<'a>(&self, bytes: &'a [u8], format: SourceFormat) -> ImportResult<RowStream<'a>> {
        match format {
            SourceFormat::Csv => CsvParser.parse_rows(bytes),
            SourceFormat::Spreadsheet => ExcelParser.parse_rows(bytes),
        }
    }
}
