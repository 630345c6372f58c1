use serde::{Deserialize, Serialize};

use crate::entities::winner_entity;

/// 候选人（外部来源产生，接收后不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub email: String,
    /// 州 (唯一键)
    pub state: String,
}

impl Candidate {
    pub fn new(id: i64, email: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            state: state.into(),
        }
    }
}

/// 中奖记录：每个州一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub id: i64,
    pub email: String,
    pub state: String,
}

impl From<Candidate> for WinnerRecord {
    fn from(c: Candidate) -> Self {
        WinnerRecord {
            id: c.id,
            email: c.email,
            state: c.state,
        }
    }
}

impl From<winner_entity::Model> for WinnerRecord {
    fn from(m: winner_entity::Model) -> Self {
        WinnerRecord {
            id: m.id,
            email: m.email,
            state: m.state,
        }
    }
}

/// upsert 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 新州，插入一行
    Inserted,
    /// 已有州，替换 id / email
    Replaced,
    /// 已有州且内容相同，未写入
    Unchanged,
}

/// 一次抽奖的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawSummary {
    pub quota: usize,
    /// 结束时已覆盖的州数量
    pub filled: usize,
    /// 拉取的批次数
    pub batches: u64,
    pub inserted: usize,
    pub replaced: usize,
    pub unchanged: usize,
    /// 配额已满且州未出现，被丢弃的候选人
    pub discarded: usize,
}

impl DrawSummary {
    pub fn upserts(&self) -> usize {
        self.inserted + self.replaced + self.unchanged
    }
}
