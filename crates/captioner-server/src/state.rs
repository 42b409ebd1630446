//! Shared application state.

use captioner_core::CaptionerConfig;
use captioner_infer::Backends;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::pipeline::CaptionSource;

/// Running totals for `/api/caption/status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptionStats {
    pub requests: u64,
    #[serde(rename = "modelCaptions")]
    pub model_captions: u64,
    #[serde(rename = "ruleBasedCaptions")]
    pub rule_based_captions: u64,
    pub failures: u64,
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: CaptionerConfig,
    pub backends: Backends,
    pub started_at: DateTime<Utc>,
    pub stats: RwLock<CaptionStats>,
}

impl AppState {
    pub fn new(config: CaptionerConfig, backends: Backends) -> Self {
        Self {
            config,
            backends,
            started_at: Utc::now(),
            stats: RwLock::new(CaptionStats::default()),
        }
    }

    pub fn record_success(&self, source: CaptionSource) {
        let mut stats = self.stats.write();
        stats.requests += 1;
        match source {
            CaptionSource::Model => stats.model_captions += 1,
            CaptionSource::RuleBased => stats.rule_based_captions += 1,
        }
    }

    pub fn record_failure(&self) {
        let mut stats = self.stats.write();
        stats.requests += 1;
        stats.failures += 1;
    }
}
