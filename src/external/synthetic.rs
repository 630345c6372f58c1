use crate::error::{AppError, AppResult};
use crate::external::CandidateSource;
use crate::models::Candidate;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

pub const US_STATES: [&str; 50] = [
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa",
    "Kansas", "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan",
    "Minnesota", "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire",
    "New Jersey", "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
    "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
    "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington", "West Virginia",
    "Wisconsin", "Wyoming",
];

/// 本地随机生成候选人（离线运行 / 测试用）
pub struct SyntheticSource {
    rng: Mutex<StdRng>,
    next_id: AtomicI64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// 固定种子，结果可复现
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateSource for SyntheticSource {
    async fn fetch_batch(&self, size: usize) -> AppResult<Vec<Candidate>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::SourceUnavailable("synthetic generator poisoned".into()))?;

        let batch = (0..size)
            .map(|_| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let state = US_STATES.choose(&mut *rng).copied().unwrap_or("Alabama");
                Candidate::new(id, format!("user{id}@example.com"), state)
            })
            .collect();

        Ok(batch)
    }
}
