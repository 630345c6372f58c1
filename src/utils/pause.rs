use async_trait::async_trait;
use std::time::Duration;

/// 批次之间的停顿（节流，不是重试）
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// 基于 tokio::time::sleep 的停顿，可被 select! 取消
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
