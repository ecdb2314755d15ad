// ==========================================
// 设备台账批量导入 - 注册服务写入客户端
// ==========================================
// 职责: 凭证获取（带缓存） + 单行提交 + 结果分类
// 分类: 2xx → Created / 409 → Conflict / 其他 → RemoteFailed
// 说明: 不自动重试；重试策略由导入编排层决定
// ==========================================

use crate::config::{RegistrySettings, ServiceIdentity};
use crate::domain::device::{DeviceCreateRequest, DeviceDefaults, ValidatedRow};
use crate::domain::import_report::RowOutcome;
use crate::registry::credential::{Credential, CredentialCache};
use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::http::RegistryApi;
use chrono::{DateTime, Duration, Local, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 注册服务判定业务键重复
pub const CONFLICT_MESSAGE: &str = "Duplicate serial or inventory number in registry";
/// 其他持久化失败（不暴露传输细节）
pub const REMOTE_FAILED_MESSAGE: &str = "Failed to save device to registry";
/// 无法取得访问凭证
pub const CREDENTIAL_UNAVAILABLE_MESSAGE: &str = "Unable to obtain registry credential";

pub struct RegistryClient {
    api: Arc<dyn RegistryApi>,
    cache: Arc<CredentialCache>,
    identity: Option<ServiceIdentity>,
    defaults: DeviceDefaults,
    fallback_lifetime: Duration,
}

impl RegistryClient {
    pub fn new(
        api: Arc<dyn RegistryApi>,
        cache: Arc<CredentialCache>,
        settings: &RegistrySettings,
        defaults: DeviceDefaults,
    ) -> Self {
        Self {
            api,
            cache,
            identity: settings.identity.clone(),
            defaults,
            fallback_lifetime: Duration::minutes(settings.token_lifetime_minutes),
        }
    }

    /// 获取有效凭证（优先复用缓存）
    pub async fn acquire_credential(&self) -> RegistryResult<Credential> {
        self.acquire_credential_at(Utc::now()).await
    }

    pub async fn acquire_credential_at(&self, now: DateTime<Utc>) -> RegistryResult<Credential> {
        self.cache
            .get_or_refresh(now, || async move {
                let identity = self
                    .identity
                    .as_ref()
                    .filter(|i| i.is_complete())
                    .ok_or(RegistryError::IdentityUnconfigured)?;

                let grant = self.api.exchange_credential(identity).await?;
                let credential = grant.into_credential(now, self.fallback_lifetime);
                debug!(expires_at = %credential.expires_at, "已换取新的注册服务凭证");
                Ok::<_, RegistryError>(credential)
            })
            .await
    }

    /// 提交一行设备数据并分类结果
    pub async fn submit(&self, row: &ValidatedRow, credential: &Credential) -> RowOutcome {
        let serial_number = row
            .serial_number
            .clone()
            .unwrap_or_else(synthesize_serial_number);
        let request = DeviceCreateRequest::from_row(
            row,
            serial_number,
            &self.defaults,
            Local::now().date_naive(),
        );

        match self
            .api
            .create_device(&request, &credential.access_token)
            .await
        {
            Ok(status) => classify_status(status, &request.inventory_number),
            Err(e) => {
                warn!(
                    inventory_number = %request.inventory_number,
                    error = %e,
                    "设备提交传输失败"
                );
                RowOutcome::RemoteFailed(REMOTE_FAILED_MESSAGE.to_string())
            }
        }
    }
}

/// HTTP 状态码 → 行结果
pub fn classify_status(status: StatusCode, inventory_number: &str) -> RowOutcome {
    if status.is_success() {
        RowOutcome::Created
    } else if status == StatusCode::CONFLICT {
        RowOutcome::Conflict(CONFLICT_MESSAGE.to_string())
    } else {
        warn!(
            status = status.as_u16(),
            inventory_number = %inventory_number,
            "注册服务拒绝设备创建"
        );
        RowOutcome::RemoteFailed(REMOTE_FAILED_MESSAGE.to_string())
    }
}

/// 文件未提供序列号时的占位值：SN- + 7 位十六进制
pub fn synthesize_serial_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("SN-{}", &hex[..7])
}
