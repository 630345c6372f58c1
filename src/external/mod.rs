pub mod random_data_api;
pub mod synthetic;

pub use random_data_api::*;
pub use synthetic::*;

use crate::error::AppResult;
use crate::models::Candidate;
use async_trait::async_trait;

/// 候选人来源：每次调用独立，返回恰好 `size` 个候选人（按返回顺序）。
/// 失败时返回 `SourceUnavailable`，不在此层重试。
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_batch(&self, size: usize) -> AppResult<Vec<Candidate>>;
}
