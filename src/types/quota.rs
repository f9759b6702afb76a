use crate::error::{MeterError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Limits a session window is measured against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaConfig {
    pub token_limit: f64,
    pub cost_limit: f64,
    pub message_limit: f64,
}

impl QuotaConfig {
    /// Build a quota, rejecting non-positive or non-finite limits
    pub fn new(token_limit: f64, cost_limit: f64, message_limit: f64) -> Result<Self> {
        for (name, value) in [
            ("token limit", token_limit),
            ("cost limit", cost_limit),
            ("message limit", message_limit),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeterError::InvalidQuota {
                    message: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        Ok(Self {
            token_limit,
            cost_limit,
            message_limit,
        })
    }
}

/// Named quota presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Plan {
    #[default]
    Pro,
    Max5,
    Max20,
    /// Only tier accepting a token limit override
    #[value(alias = "custom_max")]
    Custom,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Pro => "pro",
            Plan::Max5 => "max5",
            Plan::Max20 => "max20",
            Plan::Custom => "custom",
        }
    }

    /// Preset limits for this plan
    pub fn quota(&self) -> QuotaConfig {
        let (token_limit, cost_limit, message_limit) = match self {
            Plan::Pro => (19_000.0, 18.0, 250.0),
            Plan::Max5 => (88_000.0, 35.0, 1_000.0),
            Plan::Max20 => (220_000.0, 140.0, 2_000.0),
            Plan::Custom => (44_000.0, 50.0, 250.0),
        };
        QuotaConfig {
            token_limit,
            cost_limit,
            message_limit,
        }
    }

    /// Preset limits with an optional token override
    ///
    /// The override is honored only for [`Plan::Custom`]; other plans ignore it.
    pub fn quota_with_override(&self, token_limit: Option<u64>) -> Result<QuotaConfig> {
        let base = self.quota();
        match (self, token_limit) {
            (Plan::Custom, Some(tokens)) => {
                QuotaConfig::new(tokens as f64, base.cost_limit, base.message_limit)
            }
            _ => Ok(base),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = MeterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pro" => Ok(Plan::Pro),
            "max5" => Ok(Plan::Max5),
            "max20" => Ok(Plan::Max20),
            "custom" | "custom_max" => Ok(Plan::Custom),
            other => Err(MeterError::InvalidQuota {
                message: format!("unknown plan '{other}' (expected pro, max5, max20 or custom)"),
            }),
        }
    }
}
