// ==========================================
// 设备台账批量导入 - 表头映射器实现
// ==========================================
// 职责: 表头行 → 规范字段 → 列下标
// 归一化: TRIM + 去 BOM + 小写，再查同义词表
// 说明: 无法识别的表头忽略（兼容额外列）
// ==========================================

use crate::domain::device::DeviceField;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

// ==========================================
// ColumnMap - 规范字段 → 列下标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    indexes: HashMap<DeviceField, usize>,
}

impl ColumnMap {
    pub fn index_of(&self, field: DeviceField) -> Option<usize> {
        self.indexes.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

pub struct ColumnMapper;

impl ColumnMapper {
    /// 由表头行构建列映射
    ///
    /// # 返回
    /// - Ok(ColumnMap): 必填列全部命中
    /// - Err(MissingRequiredColumns): 列出全部缺失的必填列
    pub fn build(&self, header: &[String]) -> ImportResult<ColumnMap> {
        let mut indexes = HashMap::new();

        for (idx, raw) in header.iter().enumerate() {
            if let Some(field) = Self::normalize_header(raw) {
                // 同义词重复时取首次出现
                indexes.entry(field).or_insert(idx);
            }
        }

        let missing: Vec<String> = DeviceField::REQUIRED
            .iter()
            .filter(|f| !indexes.contains_key(*f))
            .map(|f| f.as_str().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingRequiredColumns(missing));
        }

        Ok(ColumnMap { indexes })
    }

    /// 表头归一化 + 同义词匹配
    pub fn normalize_header(raw: &str) -> Option<DeviceField> {
        let key = raw.trim().trim_matches('\u{FEFF}').trim().to_lowercase();

        let field = match key.as_str() {
            "name" | "device name" | "название" | "наименование" => DeviceField::Name,
            "modelid" | "model_id" | "model id" | "model" | "модельid" | "модель" => {
                DeviceField::ModelId
            }
            "companyid" | "company_id" | "company id" | "company" | "компанияid"
            | "компания" => DeviceField::CompanyId,
            "address" | "адрес" => DeviceField::Address,
            "place" | "location" | "место" => DeviceField::Place,
            "inventorynumber" | "inventory_number" | "inventory number" | "инвентарныйномер"
            | "инвентарный номер" => DeviceField::InventoryNumber,
            "serialnumber" | "serial_number" | "serial number" | "серийныйномер"
            | "серийный номер" => DeviceField::SerialNumber,
            _ => return None,
        };

        Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_build_canonical_header() {
        let map = ColumnMapper
            .build(&header(&[
                "Name",
                "ModelId",
                "CompanyId",
                "Address",
                "Place",
                "InventoryNumber",
            ]))
            .unwrap();

        assert_eq!(map.index_of(DeviceField::Name), Some(0));
        assert_eq!(map.index_of(DeviceField::InventoryNumber), Some(5));
        assert_eq!(map.index_of(DeviceField::SerialNumber), None);
    }

    #[test]
    fn test_build_tolerates_case_whitespace_bom_and_russian_labels() {
        let map = ColumnMapper
            .build(&header(&[
                "\u{FEFF} НАЗВАНИЕ ",
                "модель",
                "Компания",
                "  ADDRESS",
                "место",
                "Инвентарный номер",
                "Серийный номер",
            ]))
            .unwrap();

        assert_eq!(map.index_of(DeviceField::Name), Some(0));
        assert_eq!(map.index_of(DeviceField::ModelId), Some(1));
        assert_eq!(map.index_of(DeviceField::SerialNumber), Some(6));
    }

    #[test]
    fn test_first_occurrence_wins_and_unknown_ignored() {
        let map = ColumnMapper
            .build(&header(&[
                "Comment",
                "Name",
                "Название",
                "ModelId",
                "CompanyId",
                "Address",
                "Place",
                "InventoryNumber",
            ]))
            .unwrap();

        assert_eq!(map.index_of(DeviceField::Name), Some(1));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_missing_required_columns_are_all_listed() {
        let err = ColumnMapper
            .build(&header(&["Name", "ModelId", "CompanyId", "InventoryNumber"]))
            .unwrap_err();

        match err {
            ImportError::MissingRequiredColumns(cols) => {
                assert_eq!(cols, vec!["Address".to_string(), "Place".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
