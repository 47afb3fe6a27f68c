//! Text and JSON rendering of a run summary.

use crate::summary::RunSummary;

/// Render a run summary as a text report
#[must_use]
pub fn render_text(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("SCENARIO RESULTS: {} ({})\n", summary.scenario, summary.tag));
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    output.push_str(&format!("Target:    {}\n", summary.base_url));
    output.push_str(&format!("Policy:    {}\n", summary.policy));
    output.push_str(&format!("Schedule:  {}\n", summary.schedule));
    output.push_str(&format!("Started:   {}\n", summary.started_at));
    if summary.user_refs > 0 {
        output.push_str(&format!("User refs: {}\n", summary.user_refs));
    }
    output.push('\n');

    output.push_str(&format!(
        "Duration: {:.1}s │ Peak VUs: {} │ Iterations: {} │ Requests: {} │ Failed: {} ({:.2}%)\n\n",
        summary.elapsed_secs,
        summary.peak_vus,
        summary.iterations,
        summary.requests,
        summary.failed_requests,
        summary.failed_rate * 100.0
    ));

    output.push_str("Requests by Endpoint:\n");
    output.push_str("┌─────────────────┬─────────┬─────────┐\n");
    output.push_str("│ Endpoint        │ Count   │ Failed  │\n");
    output.push_str("├─────────────────┼─────────┼─────────┤\n");
    for e in &summary.endpoints {
        output.push_str(&format!(
            "│ {:<15} │ {:>7} │ {:>7} │\n",
            truncate(&e.endpoint, 15),
            e.requests,
            e.failed
        ));
    }
    output.push_str("└─────────────────┴─────────┴─────────┘\n\n");

    let l = &summary.latency;
    output.push_str("Latency (http_req_duration):\n");
    output.push_str(&format!(
        "  min={:.2}ms avg={:.2}ms p50={:.2}ms p90={:.2}ms\n",
        l.min_ms, l.avg_ms, l.p50_ms, l.p90_ms
    ));
    output.push_str(&format!(
        "  p95={:.2}ms p99={:.2}ms max={:.2}ms\n\n",
        l.p95_ms, l.p99_ms, l.max_ms
    ));

    output.push_str("Throughput:\n");
    output.push_str(&format!("  Avg: {:.1} req/s\n\n", summary.throughput_rps));

    if !summary.checks.is_empty() {
        output.push_str("Checks:\n");
        for c in &summary.checks {
            let total = c.passes + c.fails;
            let symbol = if c.fails == 0 { "✓" } else { "✗" };
            let pct = if total == 0 {
                100.0
            } else {
                c.passes as f64 / total as f64 * 100.0
            };
            output.push_str(&format!(
                "  {} {:<28} {:>6.2}% ({} ✓ / {} ✗)\n",
                symbol, c.name, pct, c.passes, c.fails
            ));
        }
        output.push('\n');
    }

    if !summary.thresholds.is_empty() {
        output.push_str("Thresholds:\n");
        for t in &summary.thresholds {
            let symbol = if t.passed { "✓" } else { "✗" };
            output.push_str(&format!(
                "  {} {} {} (actual: {})\n",
                symbol, t.metric, t.threshold, t.actual
            ));
        }
        output.push('\n');
    }

    output.push_str(if summary.passed() {
        "Result: PASSED\n"
    } else {
        "Result: FAILED\n"
    });

    output
}

/// Render a run summary as pretty JSON
#[must_use]
pub fn render_json(summary: &RunSummary) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{head}…")
    }
}
