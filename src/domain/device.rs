// ==========================================
// 设备台账批量导入 - 设备领域模型
// ==========================================
// 职责: 导入管道中流转的设备相关数据结构
// 流转: SourceRow → ValidatedRow → DeviceCreateRequest
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// DeviceField - 规范字段
// ==========================================
// 表头经 ColumnMapper 归一化后映射到这些字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceField {
    Name,
    ModelId,
    CompanyId,
    Address,
    Place,
    InventoryNumber,
    SerialNumber,
}

impl DeviceField {
    /// 必填字段，缺列即整批拒绝
    pub const REQUIRED: [DeviceField; 6] = [
        DeviceField::Name,
        DeviceField::ModelId,
        DeviceField::CompanyId,
        DeviceField::Address,
        DeviceField::Place,
        DeviceField::InventoryNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceField::Name => "Name",
            DeviceField::ModelId => "ModelId",
            DeviceField::CompanyId => "CompanyId",
            DeviceField::Address => "Address",
            DeviceField::Place => "Place",
            DeviceField::InventoryNumber => "InventoryNumber",
            DeviceField::SerialNumber => "SerialNumber",
        }
    }
}

impl fmt::Display for DeviceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// SourceRow - 源文件中的一行
// ==========================================
// line_number: 源文件中的行号（1 起，含表头），用于报告定位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub line_number: usize,
    pub cells: Vec<String>,
}

impl SourceRow {
    pub fn new(line_number: usize, cells: Vec<String>) -> Self {
        Self { line_number, cells }
    }

    /// 按列下标取单元格；越界视为空单元格
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

// ==========================================
// ValidatedRow - 通过行级校验的设备记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRow {
    pub name: String,
    pub model_id: i32,
    pub company_id: i32,
    pub address: String,
    pub place: String,
    pub inventory_number: String,
    /// 文件未提供时为 None，提交时由注册客户端生成占位值
    pub serial_number: Option<String>,
}

// ==========================================
// DeviceDefaults - 文件中不出现、由配置提供的字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDefaults {
    pub work_mode_id: i32,
    pub time_zone_id: i32,
    pub status_id: i32,
    pub service_priority_id: i32,
    pub product_matrix_id: i32,
    pub country_id: i32,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            work_mode_id: 1,
            time_zone_id: 1,
            status_id: 1,
            service_priority_id: 1,
            product_matrix_id: 1,
            country_id: 1,
        }
    }
}

// ==========================================
// DeviceCreateRequest - 注册服务创建设备请求体
// ==========================================
// 对齐: POST <registry>/devices（camelCase JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCreateRequest {
    pub name: String,
    pub model_id: i32,
    pub work_mode_id: i32,
    pub time_zone_id: i32,
    pub status_id: i32,
    pub service_priority_id: i32,
    pub product_matrix_id: i32,
    pub company_id: i32,
    pub modem_id: Option<i32>,
    pub address: String,
    pub place: String,
    pub inventory_number: String,
    pub serial_number: String,
    pub manufacture_date: NaiveDate,
    pub commissioning_date: NaiveDate,
    pub last_verification_date: Option<NaiveDate>,
    pub verification_interval_months: Option<i32>,
    pub resource_hours: Option<i32>,
    pub next_service_date: Option<NaiveDate>,
    pub service_duration_hours: Option<u8>,
    pub inventory_date: Option<NaiveDate>,
    pub country_id: i32,
    pub notes: Option<String>,
}

impl DeviceCreateRequest {
    /// 由校验通过的行 + 配置默认值组装请求体
    ///
    /// serial_number 已由调用方解析（文件值或生成的占位值）
    pub fn from_row(
        row: &ValidatedRow,
        serial_number: String,
        defaults: &DeviceDefaults,
        today: NaiveDate,
    ) -> Self {
        Self {
            name: row.name.clone(),
            model_id: row.model_id,
            work_mode_id: defaults.work_mode_id,
            time_zone_id: defaults.time_zone_id,
            status_id: defaults.status_id,
            service_priority_id: defaults.service_priority_id,
            product_matrix_id: defaults.product_matrix_id,
            company_id: row.company_id,
            modem_id: None,
            address: row.address.clone(),
            place: row.place.clone(),
            inventory_number: row.inventory_number.clone(),
            serial_number,
            manufacture_date: today,
            commissioning_date: today,
            last_verification_date: None,
            verification_interval_months: None,
            resource_hours: None,
            next_service_date: None,
            service_duration_hours: None,
            inventory_date: None,
            country_id: defaults.country_id,
            notes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_row_cell_out_of_range_is_blank() {
        let row = SourceRow::new(2, vec!["a".to_string()]);
        assert_eq!(row.cell(0), "a");
        assert_eq!(row.cell(5), "");
    }

    #[test]
    fn test_required_fields_exclude_serial() {
        assert!(!DeviceField::REQUIRED.contains(&DeviceField::SerialNumber));
        assert!(DeviceField::REQUIRED.contains(&DeviceField::Address));
    }

    #[test]
    fn test_create_request_serializes_camel_case_with_defaults() {
        let row = ValidatedRow {
            name: "Kiosk-1".to_string(),
            model_id: 3,
            company_id: 7,
            address: "Main St".to_string(),
            place: "Lobby".to_string(),
            inventory_number: "INV-001".to_string(),
            serial_number: None,
        };
        let defaults = DeviceDefaults {
            country_id: 42,
            ..DeviceDefaults::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let request = DeviceCreateRequest::from_row(&row, "SN-1".to_string(), &defaults, today);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["modelId"], 3);
        assert_eq!(json["companyId"], 7);
        assert_eq!(json["inventoryNumber"], "INV-001");
        assert_eq!(json["serialNumber"], "SN-1");
        assert_eq!(json["countryId"], 42);
        assert_eq!(json["manufactureDate"], "2026-10-19");
        assert!(json["modemId"].is_null());
    }
}
