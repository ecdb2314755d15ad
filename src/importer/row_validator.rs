// ==========================================
// 设备台账批量导入 - 行级校验器实现
// ==========================================
// 校验顺序（遇错即止）:
// 1. 必填字段非空
// 2. ModelId / CompanyId 为十进制整数
// 3. 库存号文件内唯一（大小写不敏感）
// 4. 序列号（若有）文件内唯一
// 红线: 去重集合只增不减，校验失败不回滚已占用的值
// ==========================================

use crate::domain::device::{DeviceField, SourceRow, ValidatedRow};
use crate::importer::field_mapper::ColumnMap;
use std::collections::HashSet;
use thiserror::Error;

/// 行级校验失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowValidationError {
    #[error("Required field is empty: {0}")]
    EmptyRequiredField(DeviceField),

    #[error("{0} must be an integer")]
    NotAnInteger(DeviceField),

    #[error("Duplicate inventory number in file")]
    DuplicateInventoryNumberInFile,

    #[error("Duplicate serial number in file")]
    DuplicateSerialNumberInFile,
}

// ==========================================
// DedupSets - 单次导入内的去重集合
// ==========================================
#[derive(Debug, Default)]
pub struct DedupSets {
    inventory_numbers: HashSet<String>,
    serial_numbers: HashSet<String>,
}

impl DedupSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记库存号；已存在返回 false
    pub fn insert_inventory_number(&mut self, value: &str) -> bool {
        self.inventory_numbers.insert(value.trim().to_lowercase())
    }

    /// 登记序列号；已存在返回 false
    pub fn insert_serial_number(&mut self, value: &str) -> bool {
        self.serial_numbers.insert(value.trim().to_lowercase())
    }

    pub fn inventory_count(&self) -> usize {
        self.inventory_numbers.len()
    }

    pub fn serial_count(&self) -> usize {
        self.serial_numbers.len()
    }
}

pub struct RowValidator;

impl RowValidator {
    pub fn validate(
        &self,
        row: &SourceRow,
        map: &ColumnMap,
        dedup: &mut DedupSets,
    ) -> Result<ValidatedRow, RowValidationError> {
        let value = |field: DeviceField| {
            map.index_of(field)
                .map(|idx| row.cell(idx).trim())
                .unwrap_or("")
        };

        // 1. 必填字段
        if let Some(field) = DeviceField::REQUIRED
            .iter()
            .find(|f| value(**f).is_empty())
        {
            return Err(RowValidationError::EmptyRequiredField(*field));
        }

        // 2. 整数字段
        let model_id = Self::parse_int(value(DeviceField::ModelId), DeviceField::ModelId)?;
        let company_id = Self::parse_int(value(DeviceField::CompanyId), DeviceField::CompanyId)?;

        // 3. 库存号去重
        let inventory_number = value(DeviceField::InventoryNumber);
        if !dedup.insert_inventory_number(inventory_number) {
            return Err(RowValidationError::DuplicateInventoryNumberInFile);
        }

        // 4. 序列号去重（可选列）
        let serial = value(DeviceField::SerialNumber);
        let serial_number = if serial.is_empty() {
            None
        } else {
            if !dedup.insert_serial_number(serial) {
                return Err(RowValidationError::DuplicateSerialNumberInFile);
            }
            Some(serial.to_string())
        };

        Ok(ValidatedRow {
            name: value(DeviceField::Name).to_string(),
            model_id,
            company_id,
            address: value(DeviceField::Address).to_string(),
            place: value(DeviceField::Place).to_string(),
            inventory_number: inventory_number.to_string(),
            serial_number,
        })
    }

    fn parse_int(value: &str, field: DeviceField) -> Result<i32, RowValidationError> {
        value
            .parse::<i32>()
            .map_err(|_| RowValidationError::NotAnInteger(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::ColumnMapper;

    fn map_with_serial() -> ColumnMap {
        let header: Vec<String> = [
            "Name",
            "ModelId",
            "CompanyId",
            "Address",
            "Place",
            "InventoryNumber",
            "SerialNumber",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        ColumnMapper.build(&header).unwrap()
    }

    fn row(line: usize, cells: &[&str]) -> SourceRow {
        SourceRow::new(line, cells.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_valid_row() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();
        let validated = RowValidator
            .validate(
                &row(2, &["Kiosk-1", "3", "7", "Main St", "Lobby", "INV-001", "SN-9"]),
                &map,
                &mut dedup,
            )
            .unwrap();

        assert_eq!(validated.model_id, 3);
        assert_eq!(validated.company_id, 7);
        assert_eq!(validated.serial_number.as_deref(), Some("SN-9"));
    }

    #[test]
    fn test_blank_required_field_reports_first_missing() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();
        let err = RowValidator
            .validate(&row(2, &["Kiosk-1", "3", "7", "  ", "", "INV-001"]), &map, &mut dedup)
            .unwrap_err();

        assert_eq!(err, RowValidationError::EmptyRequiredField(DeviceField::Address));
        assert_eq!(err.to_string(), "Required field is empty: Address");
        // 未到达去重步骤，不占用库存号
        assert_eq!(dedup.inventory_count(), 0);
    }

    #[test]
    fn test_non_integer_ids() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();

        let err = RowValidator
            .validate(&row(2, &["K", "3.5", "7", "A", "P", "I-1"]), &map, &mut dedup)
            .unwrap_err();
        assert_eq!(err.to_string(), "ModelId must be an integer");

        let err = RowValidator
            .validate(&row(3, &["K", "3", "1 000", "A", "P", "I-1"]), &map, &mut dedup)
            .unwrap_err();
        assert_eq!(err, RowValidationError::NotAnInteger(DeviceField::CompanyId));
    }

    #[test]
    fn test_duplicate_inventory_number_is_case_insensitive() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();

        RowValidator
            .validate(&row(2, &["K1", "1", "1", "A", "P", "inv-001"]), &map, &mut dedup)
            .unwrap();
        let err = RowValidator
            .validate(&row(3, &["K2", "1", "1", "A", "P", "INV-001"]), &map, &mut dedup)
            .unwrap_err();

        assert_eq!(err, RowValidationError::DuplicateInventoryNumberInFile);
        assert_eq!(err.to_string(), "Duplicate inventory number in file");
    }

    #[test]
    fn test_serial_duplicate_still_consumes_inventory_slot() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();

        RowValidator
            .validate(&row(2, &["K1", "1", "1", "A", "P", "INV-1", "SN-1"]), &map, &mut dedup)
            .unwrap();
        let err = RowValidator
            .validate(&row(3, &["K2", "1", "1", "A", "P", "INV-2", "sn-1"]), &map, &mut dedup)
            .unwrap_err();
        assert_eq!(err, RowValidationError::DuplicateSerialNumberInFile);

        // INV-2 已被第 3 行占用
        let err = RowValidator
            .validate(&row(4, &["K3", "1", "1", "A", "P", "INV-2", "SN-3"]), &map, &mut dedup)
            .unwrap_err();
        assert_eq!(err, RowValidationError::DuplicateInventoryNumberInFile);
    }

    #[test]
    fn test_missing_serial_is_not_deduplicated() {
        let map = map_with_serial();
        let mut dedup = DedupSets::new();

        let first = RowValidator
            .validate(&row(2, &["K1", "1", "1", "A", "P", "INV-1"]), &map, &mut dedup)
            .unwrap();
        let second = RowValidator
            .validate(&row(3, &["K2", "1", "1", "A", "P", "INV-2", ""]), &map, &mut dedup)
            .unwrap();

        assert_eq!(first.serial_number, None);
        assert_eq!(second.serial_number, None);
        assert_eq!(dedup.serial_count(), 0);
    }
}
