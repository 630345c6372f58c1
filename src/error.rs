use sea_orm::DbErr;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// 候选来源不可用：网络 / HTTP 状态 / 响应体解析失败
    #[error("Candidate source unavailable: {0}")]
    SourceUnavailable(String),

    /// 持久化层读写失败
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Draw exhausted after {batches} batches: {filled}/{quota} regions filled")]
    DrawExhausted {
        filled: usize,
        quota: usize,
        batches: u64,
    },

    #[error("Draw cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::SourceUnavailable(format!("HTTP request error: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SourceUnavailable(format!("Malformed response body: {err}"))
    }
}

impl AppError {
    /// 是否属于候选来源错误
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, AppError::SourceUnavailable(_))
    }

    /// 是否属于持久化错误
    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::PersistenceError(_))
    }
}
