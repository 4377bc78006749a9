//! HTML status report and the dashboard router serving it

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::probe::CheckResult;
use crate::state::{StateHandle, Stats};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub service_count: usize,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, service_count: usize) -> Router {
    let dashboard_state = DashboardState {
        state,
        service_count,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

fn snapshot(dashboard: &DashboardState) -> Arc<Stats> {
    dashboard.state.borrow().clone()
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let stats = snapshot(&dashboard);
    Html(render_report(
        &stats,
        dashboard.service_count,
        chrono::Utc::now().timestamp_millis() as u64,
    ))
}

async fn stats_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let stats = snapshot(&dashboard);

    axum::Json(serde_json::json!({
        "total": stats.total,
        "passed": stats.passed,
        "failed": stats.failed,
        "rounds": stats.rounds,
        "alerts_raised": stats.alerts_raised,
        "success_rate": format!("{:.1}", stats.success_rate()),
        "latest": stats.latest(dashboard.service_count).collect::<Vec<_>>(),
        "history": stats.history,
        "alerts": stats.alerts,
    }))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_epoch_ms(epoch_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn service_card(result: &CheckResult) -> String {
    let (class, badge_class, badge) = if result.healthy {
        ("service-card", "status status-up", "ONLINE")
    } else {
        ("service-card down", "status status-down", "OFFLINE")
    };
    let status = if result.status == 0 {
        "Error".to_string()
    } else {
        result.status.to_string()
    };
    let error = result
        .error
        .as_deref()
        .map(|e| format!(r#"<div class="metric">{}</div>"#, escape_html(e)))
        .unwrap_or_default();
    let transport = result
        .transport
        .as_ref()
        .map(|t| {
            format!(
                r#"<div class="metric">TLS: {}</div>"#,
                escape_html(&t.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="{class}">
        <h2>{name}</h2>
        <span class="{badge_class}">{badge}</span>
        <div class="metric">Response: {latency}ms</div>
        <div class="metric">Status: {status}</div>
        {error}{transport}
        <div class="metric"><small>{url}</small></div>
      </div>"#,
        name = escape_html(&result.service),
        latency = result.response_time_ms,
        url = escape_html(&result.url),
    )
}

/// Render the status page from a stats snapshot.
///
/// Cards show the newest `service_count` results, i.e. the latest round.
pub fn render_report(stats: &Stats, service_count: usize, now_epoch_ms: u64) -> String {
    let cards: String = stats.latest(service_count).map(service_card).collect();

    let alert_rows: String = stats
        .alerts
        .iter()
        .rev()
        .map(|a| {
            let status = if a.success { "Sent" } else { "Failed" };
            format!(
                r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                format_epoch_ms(a.timestamp_epoch_ms),
                escape_html(&a.service),
                escape_html(&a.message),
                escape_html(&a.alerter_type),
                status
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Vigilante - Status</title>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta http-equiv="refresh" content="60">
  <style>
    * {{ margin: 0; padding: 0; box-sizing: border-box; }}
    body {{ font-family: system-ui, sans-serif; background: #1a1a2e; color: #eee; padding: 20px; }}
    .container {{ max-width: 1200px; margin: 0 auto; }}
    h1 {{ color: #0f3; margin-bottom: 10px; }}
    .updated {{ color: #999; margin-bottom: 30px; }}
    .services {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; margin-bottom: 30px; }}
    .service-card {{ background: #16213e; padding: 20px; border-radius: 10px; border-left: 4px solid #0f3; }}
    .service-card.down {{ border-left-color: #f44; }}
    .service-card h2 {{ margin-bottom: 10px; }}
    .status {{ display: inline-block; padding: 4px 12px; border-radius: 4px; font-size: 12px; font-weight: 600; }}
    .status-up {{ background: #0f3; color: #000; }}
    .status-down {{ background: #f44; color: #fff; }}
    .metric {{ margin-top: 10px; font-size: 14px; color: #aaa; }}
    .stats {{ background: #16213e; padding: 20px; border-radius: 10px; margin-bottom: 30px; }}
    .stats-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 20px; margin-top: 15px; }}
    .stat {{ text-align: center; }}
    .stat-number {{ font-size: 32px; font-weight: bold; color: #0f3; }}
    .stat-label {{ color: #999; font-size: 14px; }}
    table {{ width: 100%; border-collapse: collapse; background: #16213e; }}
    th, td {{ padding: 0.5rem; text-align: left; border-bottom: 1px solid #333; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>Vigilante</h1>
    <p class="updated">Last updated: {updated} (Auto-refresh: 60s)</p>

    <div class="stats">
      <h2>Overall Statistics</h2>
      <div class="stats-grid">
        <div class="stat"><div class="stat-number">{total}</div><div class="stat-label">Total Tests</div></div>
        <div class="stat"><div class="stat-number">{passed}</div><div class="stat-label">Passed</div></div>
        <div class="stat"><div class="stat-number">{failed}</div><div class="stat-label">Failed</div></div>
        <div class="stat"><div class="stat-number">{rate:.1}%</div><div class="stat-label">Success Rate</div></div>
      </div>
    </div>

    <div class="services">
      {cards}
    </div>

    <section>
      <h2>Recent Alerts</h2>
      <table>
        <thead><tr><th>Time</th><th>Service</th><th>Message</th><th>Alerter</th><th>Status</th></tr></thead>
        <tbody>{alert_rows}</tbody>
      </table>
    </section>
  </div>
</body>
</html>"#,
        updated = format_epoch_ms(now_epoch_ms),
        total = stats.total,
        passed = stats.passed,
        failed = stats.failed,
        rate = stats.success_rate(),
        cards = cards,
        alert_rows = alert_rows,
    )
}
