use super::burn_rate::BurnRate;
use super::cost::Cost;
use super::ids::ProjectLabel;
use super::pricing::{ModelTier, TokenUsage};
use super::quota::QuotaConfig;
use super::remaining_time::RemainingTime;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Token sub-totals of a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenTotals {
    /// Input + output only; the figure compared against the quota
    pub total: u64,
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
}

impl TokenTotals {
    pub fn add(&mut self, usage: &TokenUsage) {
        self.total = self.total.saturating_add(usage.billed_tokens());
        self.input = self.input.saturating_add(usage.input_tokens);
        self.output = self.output.saturating_add(usage.output_tokens);
        self.cache_creation = self.cache_creation.saturating_add(usage.cache_creation_tokens);
        self.cache_read = self.cache_read.saturating_add(usage.cache_read_tokens);
    }
}

/// Quota-relevant tokens per pricing tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelBreakdown {
    pub opus: u64,
    pub sonnet: u64,
    pub haiku: u64,
}

impl ModelBreakdown {
    pub fn add(&mut self, tier: ModelTier, tokens: u64) {
        let bucket = match tier {
            ModelTier::Opus => &mut self.opus,
            ModelTier::Sonnet => &mut self.sonnet,
            ModelTier::Haiku => &mut self.haiku,
        };
        *bucket = bucket.saturating_add(tokens);
    }
}

/// Immutable snapshot of the active session window
#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub tokens: TokenTotals,
    pub total_cost: Cost,
    pub message_count: u64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub last_event_time: DateTime<Utc>,
    pub time_remaining: RemainingTime,
    pub is_active: bool,
    pub burn_rate: BurnRate,
    pub model_breakdown: ModelBreakdown,
    pub project_breakdown: BTreeMap<ProjectLabel, u64>,
    pub quota: QuotaConfig,
    /// Version of the price table the cost was computed with
    pub pricing_version: &'static str,
}

impl Metrics {
    pub fn token_usage_percent(&self) -> f64 {
        self.tokens.total as f64 * 100.0 / self.quota.token_limit
    }

    pub fn cost_usage_percent(&self) -> f64 {
        self.total_cost.value() * 100.0 / self.quota.cost_limit
    }

    pub fn message_usage_percent(&self) -> f64 {
        self.message_count as f64 * 100.0 / self.quota.message_limit
    }

    /// Projects ordered by tokens, largest first (ties by label)
    pub fn projects_by_tokens(&self) -> Vec<(&ProjectLabel, u64)> {
        let mut projects: Vec<_> = self
            .project_breakdown
            .iter()
            .map(|(label, tokens)| (label, *tokens))
            .collect();
        projects.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        projects
    }
}
