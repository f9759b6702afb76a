use crate::types::{Metrics, Plan};
use colored::{ColoredString, Colorize};

// Format number with thousands separator
pub fn format_number_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

// Colour a usage figure by how much of the quota it consumes
pub fn colorize_usage(text: String, percent: f64) -> ColoredString {
    if percent < 50.0 {
        text.green()
    } else if percent < 80.0 {
        text.yellow()
    } else {
        text.red()
    }
}

/// One-line summary of the active window
pub fn format_status_line(metrics: &Metrics, plan: Plan) -> String {
    let token_pct = metrics.token_usage_percent();
    let tokens = colorize_usage(
        format!(
            "{}/{} tokens ({:.1}%)",
            format_number_with_commas(metrics.tokens.total),
            format_number_with_commas(metrics.quota.token_limit as u64),
            token_pct
        ),
        token_pct,
    );
    let cost = colorize_usage(
        metrics.total_cost.to_formatted_string(),
        metrics.cost_usage_percent(),
    );
    let messages = colorize_usage(
        format!("{} msgs", metrics.message_count),
        metrics.message_usage_percent(),
    );

    let remaining = if metrics.is_active {
        format!(" ⏰ {}", metrics.time_remaining.to_colored_string())
    } else {
        " ⏰ window expired".to_string()
    };

    let project = metrics
        .projects_by_tokens()
        .first()
        .map(|(label, _)| format!(" 📁 {}", label.as_str().cyan()))
        .unwrap_or_default();

    format!(
        "[{plan}] 🪙 {tokens} 💰 {cost} 💬 {messages} 🔥 {burn}{remaining}{project}",
        burn = metrics.burn_rate.to_colored_string(),
    )
}
