// ==========================================
// 设备台账批量导入 - 访问凭证缓存
// ==========================================
// 范围: 进程级共享，跨导入运行复用
// 红线: 仅当 now + 安全余量 < 过期时间 时复用
//       "检查 → 换取 → 存储" 在同一把锁内完成
//       只允许更晚过期的凭证覆盖已存凭证
// ==========================================

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// 复用判定的安全余量
pub const SAFETY_MARGIN_SECS: i64 = 60;

static GLOBAL_CACHE: Lazy<Arc<CredentialCache>> = Lazy::new(|| Arc::new(CredentialCache::new()));

// ==========================================
// Credential - 访问凭证
// ==========================================
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, safety_margin: Duration) -> bool {
        now + safety_margin < self.expires_at
    }
}

// 令牌不进日志
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ==========================================
// CredentialCache - 单元格 + 互斥锁
// ==========================================
pub struct CredentialCache {
    slot: Mutex<Option<Credential>>,
    safety_margin: Duration,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::with_safety_margin(Duration::seconds(SAFETY_MARGIN_SECS))
    }

    pub fn with_safety_margin(safety_margin: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            safety_margin,
        }
    }

    /// 进程级共享缓存
    pub fn global() -> Arc<CredentialCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// 取有效凭证；过期或缺失时调用 exchange 换取并存储
    ///
    /// 换取期间持有锁，并发调用方等待同一次换取的结果
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        now: DateTime<Utc>,
        exchange: F,
    ) -> Result<Credential, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Credential, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.is_valid_at(now, self.safety_margin) {
                return Ok(cached.clone());
            }
            debug!(expires_at = %cached.expires_at, "缓存凭证已过期，重新换取");
        }

        let fresh = exchange().await?;
        let newer = slot
            .as_ref()
            .map_or(true, |existing| fresh.expires_at > existing.expires_at);
        if newer {
            *slot = Some(fresh.clone());
        }
        Ok(fresh)
    }

    /// 直接写入凭证（遵循"只存更新的"规则）
    pub async fn store(&self, credential: Credential) {
        let mut slot = self.slot.lock().await;
        let newer = slot
            .as_ref()
            .map_or(true, |existing| credential.expires_at > existing.expires_at);
        if newer {
            *slot = Some(credential);
        }
    }

    pub async fn current(&self) -> Option<Credential> {
        self.slot.lock().await.clone()
    }
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new()
    }
}
