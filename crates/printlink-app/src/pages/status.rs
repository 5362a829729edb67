// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker status page.

use printlink_core::WorkerStatus;

use super::{escape_html, layout};

/// Refresh interval for the status page, in seconds.
const REFRESH_SECS: u32 = 5;

pub fn render(status: &WorkerStatus) -> String {
    let badge = if status.running {
        r#"<span class="badge ok">Running</span>"#
    } else {
        r#"<span class="badge down">Stopped</span>"#
    };
    let state = escape_html(status.state.as_str());
    let pid = status
        .process_id
        .map(|pid| pid.to_string())
        .unwrap_or_else(|| "&mdash;".to_string());
    let last_start = status
        .last_start
        .map(|t| escape_html(&t.format("%Y-%m-%d %H:%M:%S UTC").to_string()))
        .unwrap_or_else(|| "Never".to_string());
    let restarts = status.restart_count;
    let last_error = status
        .last_error
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "None".to_string());
    let output = if status.last_output.is_empty() {
        r#"<p class="muted">No output yet.</p>"#.to_string()
    } else {
        let lines: Vec<String> = status.last_output.iter().map(|l| escape_html(l)).collect();
        format!("<pre>{}</pre>", lines.join("\n"))
    };

    let body = format!(
        r#"<h1>Worker Status {badge}</h1>
<dl>
  <dt>State</dt><dd>{state}</dd>
  <dt>Process ID</dt><dd>{pid}</dd>
  <dt>Last start</dt><dd>{last_start}</dd>
  <dt>Restart count</dt><dd>{restarts}</dd>
  <dt>Last error</dt><dd>{last_error}</dd>
</dl>
<h2>Recent output</h2>
{output}"#
    );

    let refresh = format!(r#"<meta http-equiv="refresh" content="{REFRESH_SECS}">"#);
    layout("Worker Status", &refresh, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use printlink_core::WorkerState;

    #[test]
    fn idle_status_shows_placeholders() {
        let page = render(&WorkerStatus::default());
        assert!(page.contains("badge down"));
        assert!(page.contains("<dd>Never</dd>"));
        assert!(page.contains("No output yet."));
        assert!(page.contains("<dd>disabled</dd>"));
    }

    #[test]
    fn running_status_shows_details() {
        let status = WorkerStatus {
            state: WorkerState::Running,
            running: true,
            last_start: Some(chrono::Utc::now()),
            last_error: Some("vortex exited with code 3".into()),
            restart_count: 4,
            process_id: Some(4242),
            last_output: vec!["<ready>".into()],
        };
        let page = render(&status);
        assert!(page.contains("badge ok"));
        assert!(page.contains("<dd>4242</dd>"));
        assert!(page.contains("<dd>4</dd>"));
        assert!(page.contains("vortex exited with code 3"));
        assert!(page.contains("&lt;ready&gt;"));
    }
}
