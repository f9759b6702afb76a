//! Session metrics engine.
//!
//! A pure function of (events, quota, now): every call re-derives windows and
//! totals from scratch and returns a fresh [`Metrics`] snapshot, or `None`
//! when no window contains `now`.

use crate::constants::BURN_RATE_WINDOW;
use crate::pricing::PRICING_V1;
use crate::session_blocks::{find_active_window, identify_session_windows, prepare_events};
use crate::trace::{NullSink, TraceEvent, TraceSink};
use crate::types::burn_rate::trailing_rate;
use crate::types::{
    BurnRate, Cost, Event, Metrics, ModelBreakdown, PricingTable, QuotaConfig, RemainingTime,
    SessionWindow, TokenTotals,
};
use crate::utils::dedup::dedup_first;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Compute the current session snapshot
pub fn compute(events: &[Event], quota: &QuotaConfig, now: DateTime<Utc>) -> Option<Metrics> {
    compute_with_trace(events, quota, now, &NullSink)
}

/// Same as [`compute`], reporting each step to `sink`
pub fn compute_with_trace(
    events: &[Event],
    quota: &QuotaConfig,
    now: DateTime<Utc>,
    sink: &dyn TraceSink,
) -> Option<Metrics> {
    let prepared = prepare_events(events, now, sink);
    let windows = identify_session_windows(&prepared, sink);
    let active = find_active_window(&windows, now, sink)?;
    Some(aggregate(active, quota, now, &PRICING_V1, sink))
}

/// Totals, breakdowns and burn rates of one window
pub fn aggregate(
    window: &SessionWindow<'_>,
    quota: &QuotaConfig,
    now: DateTime<Utc>,
    pricing: &PricingTable,
    sink: &dyn TraceSink,
) -> Metrics {
    // Idempotent with the dedup in `prepare_events`
    let (events, duplicates) = dedup_first(window.events.iter().copied());
    if duplicates > 0 {
        sink.record(TraceEvent::DuplicatesDropped { count: duplicates });
    }

    let mut tokens = TokenTotals::default();
    let mut model_breakdown = ModelBreakdown::default();
    let mut project_breakdown = BTreeMap::new();
    let mut total_cost = Cost::default();
    let mut message_count = 0u64;

    for event in &events {
        let Some(usage) = &event.usage else {
            continue;
        };
        let billed = usage.billed_tokens();

        tokens.add(usage);
        total_cost += pricing.event_cost(event);
        message_count += 1;
        model_breakdown.add(pricing.tier_for(event.model.as_deref()), billed);
        if let Some(project) = &event.project {
            let total = project_breakdown.entry(project.clone()).or_insert(0u64);
            *total = total.saturating_add(billed);
        }
    }

    let time_remaining = RemainingTime::until(window.end, now);
    let burn_rate = BurnRate {
        tokens_per_minute: trailing_rate(&events, now, BURN_RATE_WINDOW, |e| {
            e.billed_tokens() as f64
        }),
        cost_per_minute: trailing_rate(&events, now, BURN_RATE_WINDOW, |e| pricing.event_cost(e)),
        messages_per_minute: trailing_rate(&events, now, BURN_RATE_WINDOW, |e| {
            if e.usage.is_some() { 1.0 } else { 0.0 }
        }),
    };

    Metrics {
        tokens,
        total_cost,
        message_count,
        window_start: window.start,
        window_end: window.end,
        last_event_time: window.last_event_time,
        time_remaining,
        is_active: window.end > now,
        burn_rate,
        model_breakdown,
        project_breakdown,
        quota: *quota,
        pricing_version: pricing.version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{CollectingSink, MockTraceSink};
    use crate::types::{MessageId, Plan, ProjectLabel, RequestId, Role, TokenUsage};
    use chrono::{Duration, TimeZone};

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, 0).unwrap()
    }

    fn event(id: &str, timestamp: DateTime<Utc>, input: u64, output: u64) -> Event {
        Event {
            id: Some(MessageId::from(id)),
            correlation_id: RequestId::from("req"),
            timestamp,
            role: Role::Assistant,
            model: Some("claude-3-5-sonnet".to_string()),
            project: None,
            usage: Some(TokenUsage {
                input_tokens: input,
                output_tokens: output,
                ..Default::default()
            }),
        }
    }

    fn quota() -> QuotaConfig {
        Plan::Pro.quota()
    }

    #[test]
    fn test_scenario_a_single_event() {
        let events = vec![event("a", ts(10, 17), 100, 50)];
        let m = compute(&events, &quota(), ts(10, 20)).unwrap();

        assert_eq!(m.window_start, ts(10, 0));
        assert_eq!(m.window_end, ts(15, 0));
        assert!(m.is_active);
        assert_eq!(m.tokens.total, 150);
        assert_eq!(m.tokens.input, 100);
        assert_eq!(m.tokens.output, 50);
        assert!((m.total_cost.value() - 0.00105).abs() < 1e-12);
        assert_eq!(m.message_count, 1);
        assert_eq!(m.model_breakdown.sonnet, 150);
        assert_eq!(m.time_remaining.as_duration(), Duration::minutes(280));
    }

    #[test]
    fn test_scenario_b_events_within_window() {
        let events = vec![event("a", ts(10, 0), 10, 10), event("b", ts(14, 59), 10, 10)];
        let m = compute(&events, &quota(), ts(14, 59)).unwrap();
        assert_eq!(m.message_count, 2);
        assert_eq!(m.tokens.total, 40);
        assert_eq!(m.last_event_time, ts(14, 59));
    }

    #[test]
    fn test_scenario_c_later_window_is_active() {
        let events = vec![event("a", ts(10, 0), 10, 10), event("b", ts(15, 1), 7, 3)];
        let m = compute(&events, &quota(), ts(16, 0)).unwrap();
        assert_eq!(m.window_start, ts(15, 0));
        assert_eq!(m.message_count, 1);
        assert_eq!(m.tokens.total, 10);

        // Between the two windows only the first contains `now`
        let m = compute(&events, &quota(), ts(12, 0)).unwrap();
        assert_eq!(m.window_start, ts(10, 0));
        assert_eq!(m.message_count, 1);
    }

    #[test]
    fn test_scenario_d_cache_only_event_contributes_nothing() {
        let mut cache_only = event("cache", ts(10, 5), 0, 0);
        cache_only.usage = Some(TokenUsage {
            cache_creation_tokens: 1000,
            ..Default::default()
        });
        let events = vec![cache_only.clone()];
        assert!(compute(&events, &quota(), ts(10, 10)).is_none());

        let events = vec![event("a", ts(10, 0), 100, 50), cache_only];
        let m = compute(&events, &quota(), ts(10, 10)).unwrap();
        assert_eq!(m.message_count, 1);
        assert_eq!(m.tokens.cache_creation, 0);
        assert!((m.total_cost.value() - 0.00105).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_e_now_at_window_end() {
        let events = vec![event("a", ts(10, 30), 1, 1)];
        let m = compute(&events, &quota(), ts(15, 0)).unwrap();
        assert!(!m.is_active);
        assert_eq!(m.time_remaining.seconds(), 0);
        assert_eq!(m.window_end, ts(15, 0));

        assert!(compute(&events, &quota(), ts(15, 0) + Duration::seconds(1)).is_none());
    }

    #[test]
    fn test_sub_second_before_window_end_is_active() {
        let events = vec![event("a", ts(10, 30), 1, 1)];
        let now = ts(15, 0) - Duration::milliseconds(500);
        let m = compute(&events, &quota(), now).unwrap();
        assert!(m.is_active);
        assert!(m.time_remaining.has_remaining());
        assert_eq!(m.time_remaining.seconds(), 1);
    }

    #[test]
    fn test_totals_saturate_on_oversized_counters() {
        let mut a = event("a", ts(10, 0), u64::MAX, 1);
        a.project = Some(ProjectLabel::from("p"));
        let mut b = event("b", ts(10, 1), u64::MAX, 0);
        b.project = Some(ProjectLabel::from("p"));

        let m = compute(&[a, b], &quota(), ts(10, 5)).unwrap();
        assert_eq!(m.tokens.total, u64::MAX);
        assert_eq!(m.tokens.input, u64::MAX);
        assert_eq!(m.model_breakdown.sonnet, u64::MAX);
        assert_eq!(m.project_breakdown[&ProjectLabel::from("p")], u64::MAX);
        assert_eq!(m.message_count, 2);
    }

    #[test]
    fn test_no_events_is_no_active_session() {
        assert!(compute(&[], &quota(), ts(10, 0)).is_none());
    }

    #[test]
    fn test_stale_events_ignored() {
        let now = ts(12, 0);
        let events = vec![event("old", now - Duration::hours(200), 10, 10)];
        assert!(compute(&events, &quota(), now).is_none());
    }

    #[test]
    fn test_dedup_idempotence() {
        let base = vec![
            event("a", ts(10, 0), 100, 10),
            event("b", ts(10, 30), 200, 20),
            event("c", ts(11, 0), 300, 30),
        ];
        let mut duplicated = Vec::new();
        for e in &base {
            duplicated.push(e.clone());
            for drift in 1..4u64 {
                let mut copy = e.clone();
                copy.timestamp += Duration::minutes(drift as i64);
                copy.usage = Some(TokenUsage {
                    input_tokens: 9_999 * drift,
                    output_tokens: 1,
                    cache_read_tokens: 77,
                    ..Default::default()
                });
                copy.model = Some("claude-opus-4".to_string());
                duplicated.push(copy);
            }
        }

        let now = ts(11, 5);
        let once = compute(&base, &quota(), now).unwrap();
        let again = compute(&duplicated, &quota(), now).unwrap();

        assert_eq!(once.tokens, again.tokens);
        assert_eq!(once.total_cost, again.total_cost);
        assert_eq!(once.message_count, again.message_count);
        assert_eq!(once.model_breakdown, again.model_breakdown);
        assert_eq!(once.burn_rate, again.burn_rate);
        assert_eq!(once.window_start, again.window_start);
    }

    #[test]
    fn test_cache_counters_excluded_from_total_but_priced() {
        let plain = vec![event("a", ts(10, 0), 100, 50)];
        let mut heavy = plain.clone();
        heavy[0].usage = Some(TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
            cache_creation_tokens: 5_000_000,
            cache_read_tokens: 9_000_000,
        });

        let now = ts(10, 5);
        let a = compute(&plain, &quota(), now).unwrap();
        let b = compute(&heavy, &quota(), now).unwrap();

        assert_eq!(a.tokens.total, b.tokens.total);
        assert!(b.total_cost.value() > a.total_cost.value());
        // 5M * 3.75 + 9M * 0.30 per million on top of the base cost
        assert!((b.total_cost.value() - a.total_cost.value() - 21.45).abs() < 1e-6);
    }

    #[test]
    fn test_model_and_project_breakdown() {
        let mut opus = event("o", ts(10, 0), 1_000, 0);
        opus.model = Some("claude-opus-4-1".to_string());
        opus.project = Some(ProjectLabel::from("alpha"));
        let mut haiku = event("h", ts(10, 10), 0, 300);
        haiku.model = Some("Claude-3-5-HAIKU".to_string());
        haiku.project = Some(ProjectLabel::from("beta"));
        let mut unknown = event("u", ts(10, 20), 20, 0);
        unknown.model = None;
        unknown.project = Some(ProjectLabel::from("alpha"));
        let unlabeled = event("s", ts(10, 30), 5, 5);

        let events = vec![opus, haiku, unknown, unlabeled];
        let m = compute(&events, &quota(), ts(10, 40)).unwrap();

        assert_eq!(m.model_breakdown.opus, 1_000);
        assert_eq!(m.model_breakdown.haiku, 300);
        assert_eq!(m.model_breakdown.sonnet, 30);
        assert_eq!(m.project_breakdown.len(), 2);
        assert_eq!(m.project_breakdown[&ProjectLabel::from("alpha")], 1_020);
        assert_eq!(m.project_breakdown[&ProjectLabel::from("beta")], 300);
        assert_eq!(m.projects_by_tokens()[0].0.as_str(), "alpha");
    }

    #[test]
    fn test_burn_rates() {
        let now = ts(11, 0);
        let events = vec![
            event("old", ts(10, 0), 50_000, 0),
            event("a", now - Duration::minutes(8), 600, 200),
            event("b", now - Duration::minutes(3), 100, 100),
        ];
        let m = compute(&events, &quota(), now).unwrap();

        // 1000 tokens and 2 messages over the 8 minutes since the earliest recent event
        assert!((m.burn_rate.tokens_per_minute - 125.0).abs() < 1e-9);
        assert!((m.burn_rate.messages_per_minute - 0.25).abs() < 1e-12);
        let recent_cost = (700.0 * 3.0 + 300.0 * 15.0) / 1e6;
        assert!((m.burn_rate.cost_per_minute - recent_cost / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_burn_rate_zero_when_idle() {
        let events = vec![event("a", ts(10, 0), 100, 0)];
        let m = compute(&events, &quota(), ts(12, 0)).unwrap();
        assert_eq!(m.burn_rate, BurnRate::default());
        assert!(m.is_active);
    }

    #[test]
    fn test_quota_carried_into_metrics() {
        let events = vec![event("a", ts(10, 0), 9_500, 0)];
        let quota = Plan::Pro.quota();
        let m = compute(&events, &quota, ts(10, 1)).unwrap();
        assert_eq!(m.quota, quota);
        assert_eq!(m.pricing_version, PRICING_V1.version);
        assert_eq!(m.token_usage_percent(), 50.0);
    }

    #[test]
    fn test_input_order_does_not_change_result_without_duplicates() {
        let events = vec![
            event("a", ts(10, 0), 1, 1),
            event("b", ts(10, 5), 2, 2),
            event("c", ts(10, 9), 3, 3),
        ];
        let mut reversed = events.clone();
        reversed.reverse();

        let now = ts(10, 10);
        let a = compute(&events, &quota(), now).unwrap();
        let b = compute(&reversed, &quota(), now).unwrap();
        assert_eq!(a.tokens, b.tokens);
        assert_eq!(a.last_event_time, b.last_event_time);
    }

    #[test]
    fn test_trace_reports_no_active_session() {
        let mut sink = MockTraceSink::new();
        sink.expect_record()
            .withf(|e| matches!(e, TraceEvent::WindowOpened { .. }))
            .times(1)
            .return_const(());
        sink.expect_record()
            .withf(|e| *e == TraceEvent::NoActiveSession { windows: 1 })
            .times(1)
            .return_const(());

        let events = vec![event("a", ts(10, 0), 1, 1)];
        assert!(compute_with_trace(&events, &quota(), ts(20, 0), &sink).is_none());
    }

    #[test]
    fn test_trace_collects_pipeline_steps() {
        let events = vec![
            event("a", ts(10, 0), 1, 1),
            event("a", ts(10, 1), 1, 1),
        ];
        let sink = CollectingSink::new();
        compute_with_trace(&events, &quota(), ts(10, 30), &sink).unwrap();

        let trace = sink.into_events();
        assert_eq!(trace[0], TraceEvent::DuplicatesDropped { count: 1 });
        assert!(matches!(
            trace.last(),
            Some(TraceEvent::ActiveWindowSelected { events: 1, candidates: 1, .. })
        ));
    }
}
