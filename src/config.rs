use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub draw: DrawConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://lottery.db?mode=rwc".to_string(),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Http,
    Synthetic,
}

impl std::str::FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(SourceKind::Http),
            "synthetic" => Ok(SourceKind::Synthetic),
            other => Err(AppError::ConfigError(format!("unknown source kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Http,
            base_url: "https://random-data-api.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// 需要覆盖的不同州数量
    pub quota: usize,
    /// 每次拉取的候选人数
    pub batch_size: usize,
    /// 两批之间的停顿 (秒)
    pub pause_secs: u64,
    /// 可选的批次上限 (None = 不设上限)
    pub max_batches: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            quota: 25,
            batch_size: 5,
            pause_secs: 10,
            max_batches: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(AppError::ConfigError(format!("unknown report format: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

impl Config {
    /// 读取配置文件 (CONFIG_PATH, 默认 config.toml)，再用环境变量覆盖。
    /// 配置文件不存在时完全使用默认值与环境变量。
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No config file at {config_path}, using defaults");
                Config::default()
            }
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("failed to parse config file: {e}")))
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<T> {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| AppError::ConfigError(format!("invalid value for {name}: {value}")))
        }

        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("SOURCE_KIND") {
            self.source.kind = v.parse()?;
        }
        if let Some(v) = lookup("SOURCE_BASE_URL") {
            self.source.base_url = v;
        }
        if let Some(v) = lookup("SOURCE_TIMEOUT_SECS") {
            self.source.timeout_secs = parse("SOURCE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DRAW_QUOTA") {
            self.draw.quota = parse("DRAW_QUOTA", &v)?;
        }
        if let Some(v) = lookup("DRAW_BATCH_SIZE") {
            self.draw.batch_size = parse("DRAW_BATCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("DRAW_PAUSE_SECS") {
            self.draw.pause_secs = parse("DRAW_PAUSE_SECS", &v)?;
        }
        if let Some(v) = lookup("DRAW_MAX_BATCHES") {
            self.draw.max_batches = Some(parse("DRAW_MAX_BATCHES", &v)?);
        }
        if let Some(v) = lookup("REPORT_FORMAT") {
            self.report.format = v.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.draw.quota == 0 {
            return Err(AppError::ConfigError("draw.quota must be positive".into()));
        }
        if self.draw.batch_size == 0 {
            return Err(AppError::ConfigError(
                "draw.batch_size must be positive".into(),
            ));
        }
        if self.draw.max_batches == Some(0) {
            return Err(AppError::ConfigError(
                "draw.max_batches must be positive when set".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::ConfigError(
                "database.max_connections must be positive".into(),
            ));
        }
        Ok(())
    }
}
