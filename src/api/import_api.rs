// ==========================================
// 设备导入API
// ==========================================
// 职责: 上传文件（文件名 + 字节）→ 导入报告
// 上游: HTTP multipart 上传处理 / 命令行
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfig;
use crate::domain::import_report::ImportReport;
use crate::importer::{DeviceImporter, DeviceImporterImpl, SourceFormat};
use crate::registry::{CredentialCache, HttpRegistryApi, RegistryClient};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// 未选择文件 / 空上传
pub const NO_FILE_MESSAGE: &str = "No file was uploaded.";

/// 导入API
pub struct ImportApi {
    importer: Arc<dyn DeviceImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn DeviceImporter>) -> Self {
        Self { importer }
    }

    /// 按配置组装 HTTP 注册客户端；凭证缓存使用进程级共享实例
    pub fn from_config(config: &ImportConfig) -> ApiResult<Self> {
        let api = HttpRegistryApi::new(&config.registry)?;
        let client = RegistryClient::new(
            Arc::new(api),
            CredentialCache::global(),
            &config.registry,
            config.defaults,
        );
        Ok(Self::new(Arc::new(DeviceImporterImpl::new(client))))
    }

    /// 导入一个上传文件
    pub async fn import_upload(&self, file_name: &str, bytes: &[u8]) -> ImportReport {
        self.import_upload_with_cancel(file_name, bytes, &CancellationToken::new())
            .await
    }

    /// 导入一个上传文件（可取消）
    pub async fn import_upload_with_cancel(
        &self,
        file_name: &str,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> ImportReport {
        if bytes.is_empty() {
            warn!(file_name = %file_name, "上传内容为空");
            return ImportReport::rejected(Uuid::new_v4().to_string(), NO_FILE_MESSAGE);
        }

        let format = match SourceFormat::from_file_name(file_name) {
            Ok(format) => format,
            Err(e) => {
                warn!(file_name = %file_name, error = %e, "文件格式不支持");
                return ImportReport::rejected(Uuid::new_v4().to_string(), e.to_string());
            }
        };

        info!(file_name = %file_name, format = ?format, "接收导入文件");
        self.importer.import(bytes, format, cancel).await
    }

    /// 从本地路径导入
    pub async fn import_file(&self, path: &Path, cancel: &CancellationToken) -> ApiResult<ImportReport> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidInput(format!("invalid file name: {}", path.display())))?;

        Ok(self.import_upload_with_cancel(file_name, &bytes, cancel).await)
    }
}
