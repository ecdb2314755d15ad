// ==========================================
// 设备台账批量导入 - 设备导入器实现
// ==========================================
// 流程: 解析 → 表头映射 → 逐行校验 → 逐行提交 → 汇总报告
// 状态: NotStarted → HeaderChecked → Processing → Completed
// 红线:
// - 行严格按源顺序串行处理（去重集合依赖顺序）
// - 任一行失败不终止整批
// - 取消只在行与行之间生效，不打断正在提交的行
// ==========================================

use crate::domain::device::SourceRow;
use crate::domain::import_report::{ImportReport, ReportAccumulator, RowOutcome};
use crate::importer::device_importer_trait::DeviceImporter;
use crate::importer::field_mapper::{ColumnMap, ColumnMapper};
use crate::importer::file_parser::{SourceFormat, UniversalFileParser};
use crate::importer::row_validator::{DedupSets, RowValidator};
use crate::registry::{Credential, RegistryClient, CREDENTIAL_UNAVAILABLE_MESSAGE};
use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportPhase - 单次导入的状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    NotStarted,
    HeaderChecked,
    Processing,
    Completed,
}

// ==========================================
// RunContext - 单次导入的运行上下文
// ==========================================
// 生命周期 = 一次导入；不跨运行共享
#[derive(Debug)]
pub struct RunContext {
    pub run_id: String,
    pub dedup: DedupSets,
    phase: ImportPhase,
    /// 服务身份未配置：本次运行内后续行直接失败，不再尝试换取
    identity_unconfigured: bool,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            dedup: DedupSets::new(),
            phase: ImportPhase::NotStarted,
            identity_unconfigured: false,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    fn advance(&mut self, next: ImportPhase) {
        debug!(run_id = %self.run_id, from = ?self.phase, to = ?next, "导入状态迁移");
        self.phase = next;
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// DeviceImporterImpl - 设备导入器实现
// ==========================================
pub struct DeviceImporterImpl {
    file_parser: UniversalFileParser,
    column_mapper: ColumnMapper,
    row_validator: RowValidator,
    registry: RegistryClient,
}

impl DeviceImporterImpl {
    pub fn new(registry: RegistryClient) -> Self {
        Self {
            file_parser: UniversalFileParser,
            column_mapper: ColumnMapper,
            row_validator: RowValidator,
            registry,
        }
    }

    /// 在给定运行上下文中执行导入
    pub async fn run(
        &self,
        ctx: &mut RunContext,
        bytes: &[u8],
        format: SourceFormat,
        cancel: &CancellationToken,
    ) -> ImportReport {
        let started = Instant::now();
        info!(
            run_id = %ctx.run_id,
            format = ?format,
            size_bytes = bytes.len(),
            "开始导入设备数据"
        );

        // === 步骤 1: 解析文件 ===
        let mut rows = match self.file_parser.parse(bytes, format) {
            Ok(rows) => rows,
            Err(e) => {
                error!(run_id = %ctx.run_id, error = %e, "文件解析失败");
                ctx.advance(ImportPhase::Completed);
                return ImportReport::rejected(ctx.run_id.clone(), e.to_string());
            }
        };

        // === 步骤 2: 表头映射 ===
        let header = match rows.next() {
            None => {
                info!(run_id = %ctx.run_id, "文件为空");
                ctx.advance(ImportPhase::Completed);
                return ReportAccumulator::new().finish(ctx.run_id.clone(), false);
            }
            Some(header) => header,
        };

        let column_map = match self.column_mapper.build(&header.cells) {
            Ok(map) => map,
            Err(e) => {
                warn!(run_id = %ctx.run_id, error = %e, "表头校验失败，整批拒绝");
                ctx.advance(ImportPhase::Completed);
                return ImportReport::rejected(ctx.run_id.clone(), e.to_string());
            }
        };
        ctx.advance(ImportPhase::HeaderChecked);

        // === 步骤 3: 逐行处理 ===
        ctx.advance(ImportPhase::Processing);
        let mut acc = ReportAccumulator::new();
        let mut cancelled = false;

        for row in rows {
            if cancel.is_cancelled() {
                info!(run_id = %ctx.run_id, processed = acc.total_rows(), "导入已取消");
                cancelled = true;
                break;
            }

            let row_number = row.line_number;
            let outcome = self.process_row(ctx, &row, &column_map).await;

            if let Some(reason) = outcome.reason() {
                warn!(run_id = %ctx.run_id, row_number, reason, "行导入失败");
            }
            acc = acc.record(row_number, outcome);
        }

        ctx.advance(ImportPhase::Completed);
        let report = acc.finish(ctx.run_id.clone(), cancelled);

        info!(
            run_id = %ctx.run_id,
            total = report.total_rows,
            success = report.success_count,
            errors = report.error_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "设备数据导入完成"
        );

        report
    }

    /// 单行: 校验 → 凭证 → 提交
    async fn process_row(
        &self,
        ctx: &mut RunContext,
        row: &SourceRow,
        column_map: &ColumnMap,
    ) -> RowOutcome {
        let validated = match self
            .row_validator
            .validate(row, column_map, &mut ctx.dedup)
        {
            Ok(validated) => validated,
            Err(e) => return RowOutcome::ValidationFailed(e.to_string()),
        };

        let credential = match self.credential_for_row(ctx).await {
            Some(credential) => credential,
            None => return RowOutcome::RemoteFailed(CREDENTIAL_UNAVAILABLE_MESSAGE.to_string()),
        };

        self.registry.submit(&validated, &credential).await
    }

    /// 每行都重新获取凭证（缓存命中时无网络开销）；
    /// 身份未配置时记入上下文，后续行不再尝试
    async fn credential_for_row(&self, ctx: &mut RunContext) -> Option<Credential> {
        if ctx.identity_unconfigured {
            return None;
        }

        match self.registry.acquire_credential().await {
            Ok(credential) => Some(credential),
            Err(e) => {
                if e.is_unconfigured() {
                    ctx.identity_unconfigured = true;
                }
                warn!(run_id = %ctx.run_id, error = %e, "获取注册服务凭证失败");
                None
            }
        }
    }
}

#[async_trait]
impl DeviceImporter for DeviceImporterImpl {
    #[instrument(skip_all, fields(format = ?format))]
    async fn import(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        cancel: &CancellationToken,
    ) -> ImportReport {
        let mut ctx = RunContext::new();
        self.run(&mut ctx, bytes, format, cancel).await
    }
}
