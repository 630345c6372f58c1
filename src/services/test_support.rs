//! 抽奖测试用的替身：脚本化来源、内存存储、计数停顿。

use crate::error::{AppError, AppResult};
use crate::external::CandidateSource;
use crate::models::{Candidate, UpsertOutcome, WinnerRecord};
use crate::services::WinnerStore;
use crate::utils::Pause;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn user(id: i64, state: &str) -> Candidate {
    Candidate::new(id, format!("user{id}@example.com"), state)
}

pub fn batch(users: &[(i64, &str)]) -> Vec<Candidate> {
    users.iter().map(|(id, state)| user(*id, state)).collect()
}

/// 按顺序返回预设批次；耗尽后返回 SourceUnavailable
#[derive(Default)]
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Vec<Candidate>>>,
    requested: Mutex<Vec<usize>>,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Vec<Candidate>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// 每次 fetch_batch 请求的大小
    pub fn requested(&self) -> Vec<usize> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn fetch_batch(&self, size: usize) -> AppResult<Vec<Candidate>> {
        self.requested.lock().unwrap().push(size);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::SourceUnavailable("script exhausted".into()))
    }
}

/// 内存存储，记录每次 upsert 调用
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<String, WinnerRecord>>,
    upserts: Mutex<Vec<WinnerRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<WinnerRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.rows.lock().unwrap();
            for r in rows {
                map.insert(r.state.clone(), r);
            }
        }
        store
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn upserted_ids(&self) -> Vec<i64> {
        self.upserts.lock().unwrap().iter().map(|r| r.id).collect()
    }

    pub fn row(&self, state: &str) -> Option<WinnerRecord> {
        self.rows.lock().unwrap().get(state).cloned()
    }
}

#[async_trait]
impl WinnerStore for MemoryStore {
    async fn regions(&self) -> AppResult<HashSet<String>> {
        Ok(self.rows.lock().unwrap().keys().cloned().collect())
    }

    async fn get(&self, state: &str) -> AppResult<Option<WinnerRecord>> {
        Ok(self.row(state))
    }

    async fn upsert(&self, record: &WinnerRecord) -> AppResult<UpsertOutcome> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(sea_orm::DbErr::Custom("database is locked".into()).into());
        }
        self.upserts.lock().unwrap().push(record.clone());
        let previous = self
            .rows
            .lock()
            .unwrap()
            .insert(record.state.clone(), record.clone());
        Ok(match previous {
            None => UpsertOutcome::Inserted,
            Some(p) if p == *record => UpsertOutcome::Unchanged,
            Some(_) => UpsertOutcome::Replaced,
        })
    }

    async fn all(&self) -> AppResult<Vec<WinnerRecord>> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct CountingPause {
    calls: AtomicUsize,
    last: Mutex<Option<Duration>>,
}

impl CountingPause {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Duration> {
        *self.last.lock().unwrap()
    }
}

#[async_trait]
impl Pause for CountingPause {
    async fn pause(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(duration);
    }
}
