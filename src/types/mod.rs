pub mod burn_rate;
pub mod cost;
pub mod event;
pub mod ids;
pub mod metrics;
pub mod pricing;
pub mod quota;
pub mod record;
pub mod remaining_time;
pub mod session;

pub use burn_rate::BurnRate;
pub use cost::Cost;
pub use event::{Event, Role};
pub use ids::{MessageId, ProjectLabel, RequestId, UniqueHash};
pub use metrics::{Metrics, ModelBreakdown, TokenTotals};
pub use pricing::{ModelPricing, ModelTier, PricingTable, TierRule, TokenUsage};
pub use quota::{Plan, QuotaConfig};
pub use record::{RawMessage, RawRecord, RawRequest, RawUsage};
pub use remaining_time::RemainingTime;
pub use session::SessionWindow;
