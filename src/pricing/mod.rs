use crate::constants::COST_DECIMAL_PLACES;
use crate::types::{Event, ModelPricing, ModelTier, PricingTable, TierRule, TokenUsage};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Current pricing table, USD per million tokens
pub static PRICING_V1: PricingTable = PricingTable {
    version: "v1",
    rules: &[
        TierRule {
            needle: "opus",
            tier: ModelTier::Opus,
        },
        TierRule {
            needle: "haiku",
            tier: ModelTier::Haiku,
        },
        TierRule {
            needle: "sonnet",
            tier: ModelTier::Sonnet,
        },
    ],
    fallback: ModelTier::Sonnet,
    opus: ModelPricing {
        input_per_million: 15.0,
        output_per_million: 75.0,
        cache_creation_per_million: 18.75,
        cache_read_per_million: 1.5,
    },
    sonnet: ModelPricing {
        input_per_million: 3.0,
        output_per_million: 15.0,
        cache_creation_per_million: 3.75,
        cache_read_per_million: 0.3,
    },
    haiku: ModelPricing {
        input_per_million: 0.25,
        output_per_million: 1.25,
        cache_creation_per_million: 0.3,
        cache_read_per_million: 0.03,
    },
};

impl PricingTable {
    /// Resolve the tier for a model identifier (case-insensitive substring match)
    pub fn tier_for(&self, model: Option<&str>) -> ModelTier {
        let Some(model) = model else {
            return self.fallback;
        };
        let model = model.to_lowercase();
        self.rules
            .iter()
            .find(|rule| model.contains(rule.needle))
            .map(|rule| rule.tier)
            .unwrap_or(self.fallback)
    }

    /// Cost of a single event, rounded to a fixed number of decimals
    pub fn event_cost(&self, event: &Event) -> f64 {
        match &event.usage {
            Some(usage) => {
                let tier = self.tier_for(event.model.as_deref());
                calculate_cost(usage, self.pricing(tier))
            }
            None => 0.0,
        }
    }
}

/// Cost of the given counters, cache included
pub fn calculate_cost(tokens: &TokenUsage, pricing: &ModelPricing) -> f64 {
    let cost = tokens.input_tokens as f64 / TOKENS_PER_MILLION * pricing.input_per_million
        + tokens.output_tokens as f64 / TOKENS_PER_MILLION * pricing.output_per_million
        + tokens.cache_creation_tokens as f64 / TOKENS_PER_MILLION
            * pricing.cache_creation_per_million
        + tokens.cache_read_tokens as f64 / TOKENS_PER_MILLION * pricing.cache_read_per_million;

    round_cost(cost)
}

#[inline]
fn round_cost(value: f64) -> f64 {
    let factor = 10f64.powi(COST_DECIMAL_PLACES);
    (value * factor).round() / factor
}
