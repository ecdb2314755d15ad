// ==========================================
// 设备台账批量导入 - 注册服务 HTTP 传输层
// ==========================================
// 接口:
// - POST <registry>/<token_path>   {identity, secret} → {accessToken, expiresInMinutes | expiresAt}
// - POST <registry>/<devices_path> 设备创建请求 + Bearer → 201 | 409 | 其他
// ==========================================

use crate::config::{RegistrySettings, ServiceIdentity};
use crate::domain::device::DeviceCreateRequest;
use crate::registry::credential::Credential;
use crate::registry::error::{RegistryError, RegistryResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ==========================================
// RegistryApi Trait
// ==========================================
// 实现者: HttpRegistryApi（测试中替换为内存实现）
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// 用服务身份换取访问令牌
    async fn exchange_credential(&self, identity: &ServiceIdentity) -> RegistryResult<TokenGrant>;

    /// 提交一条设备创建请求，返回 HTTP 状态码（不做分类）
    async fn create_device(
        &self,
        request: &DeviceCreateRequest,
        access_token: &str,
    ) -> RegistryResult<StatusCode>;
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    identity: &'a str,
    secret: &'a str,
}

/// 令牌换取响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in_minutes: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenGrant {
    /// 转换为带绝对过期时间的凭证
    ///
    /// 优先级: expiresAt > expiresInMinutes > 配置的默认有效期
    pub fn into_credential(self, now: DateTime<Utc>, fallback_lifetime: Duration) -> Credential {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in_minutes.map(|m| now + Duration::minutes(m)))
            .unwrap_or(now + fallback_lifetime);

        Credential::new(self.access_token, expires_at)
    }
}

// ==========================================
// HttpRegistryApi - reqwest 实现
// ==========================================
pub struct HttpRegistryApi {
    client: reqwest::Client,
    base_url: String,
    token_path: String,
    devices_path: String,
}

impl HttpRegistryApi {
    pub fn new(settings: &RegistrySettings) -> RegistryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| RegistryError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            token_path: settings.token_path.clone(),
            devices_path: settings.devices_path.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

/// 拼接基础地址与相对路径，处理两侧斜杠
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl RegistryApi for HttpRegistryApi {
    async fn exchange_credential(&self, identity: &ServiceIdentity) -> RegistryResult<TokenGrant> {
        let url = self.endpoint(&self.token_path);
        debug!(url = %url, identity = %identity.identity, "换取注册服务令牌");

        let response = self
            .client
            .post(&url)
            .json(&TokenRequest {
                identity: &identity.identity,
                secret: &identity.secret,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "令牌换取被拒绝");
            return Err(RegistryError::CredentialRejected(status.as_u16()));
        }

        let grant: TokenGrant = response.json().await?;
        if grant.access_token.trim().is_empty() {
            return Err(RegistryError::Decode("empty access token".to_string()));
        }
        Ok(grant)
    }

    async fn create_device(
        &self,
        request: &DeviceCreateRequest,
        access_token: &str,
    ) -> RegistryResult<StatusCode> {
        let url = self.endpoint(&self.devices_path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(500).collect();
            debug!(
                status = status.as_u16(),
                inventory_number = %request.inventory_number,
                body = %preview,
                "设备创建未成功"
            );
        }

        Ok(status)
    }
}
