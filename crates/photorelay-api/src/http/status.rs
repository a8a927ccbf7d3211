//! `GET /`: status page for operators, refreshed every ten seconds.

use std::sync::Arc;

use axum::{extract::State, response::Html};
use tracing::warn;

use crate::state::ApiState;

/// Seconds between automatic page reloads.
const REFRESH_SECS: u32 = 10;

const STYLE: &str = "
body { font-family: 'Segoe UI', Arial, sans-serif; background: #4b4f8f; color: #fff;
       margin: 0; padding: 20px; }
.container { max-width: 800px; margin: 0 auto; background: rgba(255,255,255,0.1);
             border-radius: 20px; padding: 30px; }
h1 { text-align: center; }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 20px; }
.stat-card { background: rgba(255,255,255,0.2); border-radius: 15px; padding: 20px; text-align: center; }
.stat-value { font-size: 2.5em; font-weight: bold; }
.stat-label { opacity: 0.8; margin-top: 5px; }
.endpoint { background: rgba(0,0,0,0.2); border-radius: 10px; padding: 15px; margin: 10px 0;
            font-family: monospace; }
.method { display: inline-block; padding: 3px 8px; border-radius: 5px; font-size: 12px; font-weight: bold; }
.post { background: #49cc90; }
.get { background: #61affe; }
";

pub(crate) async fn status_page(State(state): State<Arc<ApiState>>) -> Html<String> {
    let stored = match state.catalog.scan().await {
        Ok(photos) => photos.len(),
        Err(err) => {
            warn!(error = %err, "status page could not count stored photos");
            0
        }
    };
    let snapshot = state.metrics.snapshot();
    let save_dir = state.absolute_save_dir();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta http-equiv="refresh" content="{REFRESH_SECS}">
<title>Photo Relay</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
<h1>Photo Relay</h1>
<div class="stats">
<div class="stat-card"><div class="stat-value">{received}</div><div class="stat-label">Received this session</div></div>
<div class="stat-card"><div class="stat-value">{stored}</div><div class="stat-label">Stored photos</div></div>
<div class="stat-card"><div class="stat-value">{forwarded}</div><div class="stat-label">Forwarded this session</div></div>
</div>
<h3>Remote forwarding</h3>
<div class="endpoint"><strong>Endpoint:</strong> {endpoint}<br><strong>Interval:</strong> every {interval} s<br><strong>Recorded as sent:</strong> {sent_total}</div>
<h3>API endpoints</h3>
<div class="endpoint"><span class="method post">POST</span> /upload - upload a photo</div>
<div class="endpoint"><span class="method get">GET</span> /list - stored photos</div>
<div class="endpoint"><span class="method get">GET</span> /health - service health</div>
<div class="endpoint"><span class="method get">GET</span> /metrics - Prometheus metrics</div>
<h3>Save directory</h3>
<div class="endpoint">{save_dir}</div>
</div>
</body>
</html>
"#,
        received = snapshot.received,
        forwarded = snapshot.forwarded,
        sent_total = snapshot.sent_total,
        endpoint = escape_html(state.remote_endpoint.as_str()),
        interval = state.upload_interval.as_secs(),
        save_dir = escape_html(&save_dir.display().to_string()),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
