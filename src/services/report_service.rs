use crate::config::ReportFormat;
use crate::error::{AppError, AppResult};
use crate::models::WinnerRecord;
use crate::services::WinnerStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn WinnerStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn WinnerStore>) -> Self {
        Self { store }
    }

    /// 读取全部中奖者并渲染
    pub async fn report(&self, format: ReportFormat) -> AppResult<String> {
        let winners = self.store.all().await?;
        match format {
            ReportFormat::Text => Ok(render_text(&winners)),
            ReportFormat::Json => render_json(&winners),
        }
    }
}

pub fn render_text(winners: &[WinnerRecord]) -> String {
    let mut out = format!("\n {} Winners:\n", winners.len());
    for w in winners {
        out.push_str(&format!("({}, '{}', '{}')\n", w.id, w.email, w.state));
    }
    out
}

pub fn render_json(winners: &[WinnerRecord]) -> AppResult<String> {
    serde_json::to_string_pretty(winners)
        .map_err(|e| AppError::InternalError(format!("failed to render report: {e}")))
}
