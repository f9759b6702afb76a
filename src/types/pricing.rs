use serde::Serialize;
use std::fmt;

/// Pricing class resolved from a model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Opus,
    Sonnet,
    Haiku,
}

impl ModelTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Opus => "opus",
            ModelTier::Sonnet => "sonnet",
            ModelTier::Haiku => "haiku",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// USD per million tokens for each counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
    pub cache_creation_per_million: f64,
    pub cache_read_per_million: f64,
}

/// One row of the tier lookup: a case-insensitive substring and the tier it selects
#[derive(Debug, Clone, Copy)]
pub struct TierRule {
    pub needle: &'static str,
    pub tier: ModelTier,
}

/// Versioned model-to-price lookup
///
/// Rules are tried in order and the first substring match wins, so their order
/// is part of the table's behavior. Unmatched or absent models use `fallback`.
#[derive(Debug, Clone, Copy)]
pub struct PricingTable {
    pub version: &'static str,
    pub rules: &'static [TierRule],
    pub fallback: ModelTier,
    pub opus: ModelPricing,
    pub sonnet: ModelPricing,
    pub haiku: ModelPricing,
}

impl PricingTable {
    pub fn pricing(&self, tier: ModelTier) -> &ModelPricing {
        match tier {
            ModelTier::Opus => &self.opus,
            ModelTier::Sonnet => &self.sonnet,
            ModelTier::Haiku => &self.haiku,
        }
    }
}

/// Four non-negative usage counters of one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
}

impl TokenUsage {
    /// Tokens counted toward the quota (cache counters excluded)
    #[inline]
    pub fn billed_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    #[inline]
    pub fn is_billable(&self) -> bool {
        self.billed_tokens() > 0
    }
}
