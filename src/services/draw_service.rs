use crate::config::DrawConfig;
use crate::error::{AppError, AppResult};
use crate::external::CandidateSource;
use crate::models::{Candidate, DrawSummary, UpsertOutcome, WinnerRecord};
use crate::services::WinnerStore;
use crate::utils::Pause;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// 一次抽奖过程中已覆盖的州（不持久化，每次 draw 从存储重新加载）
#[derive(Debug, Clone)]
pub struct DrawSession {
    quota: usize,
    filled: HashSet<String>,
}

impl DrawSession {
    pub fn seed(quota: usize, regions: HashSet<String>) -> Self {
        Self {
            quota,
            filled: regions,
        }
    }

    pub fn len(&self) -> usize {
        self.filled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.filled.len() >= self.quota
    }

    pub fn contains(&self, state: &str) -> bool {
        self.filled.contains(state)
    }

    /// 选中规则：配额未满时全部选中；已满时只接受已有州的替换
    pub fn selects(&self, candidate: &Candidate) -> bool {
        !self.is_full() || self.contains(&candidate.state)
    }

    /// 记录州，返回是否新增
    pub fn record(&mut self, state: &str) -> bool {
        if self.filled.contains(state) {
            return false;
        }
        self.filled.insert(state.to_string())
    }
}

/// 抽奖循环参数；配额由调用方传给 `draw`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOptions {
    pub batch_size: usize,
    pub pause: Duration,
    pub max_batches: Option<u64>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions::from(&DrawConfig::default())
    }
}

impl From<&DrawConfig> for DrawOptions {
    fn from(c: &DrawConfig) -> Self {
        DrawOptions {
            batch_size: c.batch_size,
            pause: Duration::from_secs(c.pause_secs),
            max_batches: c.max_batches,
        }
    }
}

#[derive(Clone)]
pub struct DrawService {
    source: Arc<dyn CandidateSource>,
    store: Arc<dyn WinnerStore>,
    pause: Arc<dyn Pause>,
    options: DrawOptions,
}

impl DrawService {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        store: Arc<dyn WinnerStore>,
        pause: Arc<dyn Pause>,
        options: DrawOptions,
    ) -> Self {
        Self {
            source,
            store,
            pause,
            options,
        }
    }

    /// 抽奖 (Draw)
    ///
    /// 逻辑:
    /// 1. 从存储读取已有州，初始化 session
    /// 2. 未满配额时拉取一批候选人，按返回顺序逐个应用选中规则并 upsert
    /// 3. 整批处理完仍未满则停顿后继续；满额即返回
    ///
    /// 整批处理完才检查是否满额，同批后续的替换不会被跳过。
    /// 未配置 `max_batches` 时，来源若始终凑不齐配额则一直循环。
    pub async fn draw(&self, quota: usize) -> AppResult<DrawSummary> {
        if quota == 0 {
            return Err(AppError::ValidationError("Quota must be positive".into()));
        }

        let mut session = DrawSession::seed(quota, self.store.regions().await?);
        let mut summary = DrawSummary {
            quota,
            ..Default::default()
        };

        log::info!(
            "Starting draw: {}/{} regions already filled",
            session.len(),
            quota
        );

        while !session.is_full() {
            let batch = self.source.fetch_batch(self.options.batch_size).await?;
            summary.batches += 1;

            self.apply_batch(&mut session, batch, &mut summary).await?;

            log::info!(
                "Batch {} processed: {}/{} regions filled",
                summary.batches,
                session.len(),
                quota
            );

            if session.is_full() {
                break;
            }

            if let Some(max) = self.options.max_batches
                && summary.batches >= max
            {
                log::error!(
                    "Giving up after {} batches with {}/{} regions filled",
                    summary.batches,
                    session.len(),
                    quota
                );
                return Err(AppError::DrawExhausted {
                    filled: session.len(),
                    quota,
                    batches: summary.batches,
                });
            }

            self.pause.pause(self.options.pause).await;
        }

        summary.filled = session.len();
        log::info!(
            "Draw complete: {} regions after {} batches ({} upserts: {} inserted, {} replaced; {} discarded)",
            summary.filled,
            summary.batches,
            summary.upserts(),
            summary.inserted,
            summary.replaced,
            summary.discarded
        );
        Ok(summary)
    }

    async fn apply_batch(
        &self,
        session: &mut DrawSession,
        batch: Vec<Candidate>,
        summary: &mut DrawSummary,
    ) -> AppResult<()> {
        for candidate in batch {
            if !session.selects(&candidate) {
                log::debug!(
                    "Discarded candidate {} from {}: quota full",
                    candidate.id,
                    candidate.state
                );
                summary.discarded += 1;
                continue;
            }

            let record = WinnerRecord::from(candidate);
            match self.store.upsert(&record).await? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Replaced => summary.replaced += 1,
                UpsertOutcome::Unchanged => summary.unchanged += 1,
            }
            session.record(&record.state);
        }
        Ok(())
    }
}
