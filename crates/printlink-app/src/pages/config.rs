// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Worker configuration form.

use printlink_core::WorkerConfig;

use super::{escape_html, layout};

/// Submits the form as JSON to `POST /config`.
const SCRIPT: &str = r#"<script>
async function saveConfig(event) {
  event.preventDefault();
  const form = event.target;
  const body = {
    site: form.site.value,
    provider: "http",
    host: form.host.value,
    port: form.port.value,
    email: form.email.value,
    start_vortex: form.start_vortex.checked
  };
  const message = document.getElementById("message");
  try {
    const res = await fetch("/config", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(body)
    });
    const data = await res.json();
    message.textContent = data.success ? "Saved. The worker is restarting." : ("Error: " + data.error);
  } catch (err) {
    message.textContent = "Error: " + err;
  }
}

async function stopService() {
  if (!confirm("Stop the print server and the worker?")) return;
  const res = await fetch("/shutdown", { method: "POST" });
  const data = await res.json();
  document.getElementById("message").textContent = data.message || data.error;
}
</script>"#;

pub fn render(config: &WorkerConfig) -> String {
    let site = escape_html(&config.site);
    let host = escape_html(&config.host);
    let port = escape_html(&config.port);
    let email = escape_html(&config.email);
    let checked = if config.auto_start() { " checked" } else { "" };
    let missing = config.missing_fields();
    let notice = if missing.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="muted">Missing: {}</p>"#,
            escape_html(&missing.join(", "))
        )
    };

    let body = format!(
        r#"<h1>Print Server Configuration</h1>
{notice}
<form onsubmit="saveConfig(event)">
  <label for="site">Site</label>
  <input type="text" id="site" name="site" value="{site}" placeholder="shop.example.com">
  <label for="host">Host</label>
  <input type="text" id="host" name="host" value="{host}" placeholder="0.0.0.0">
  <label for="port">Port</label>
  <input type="text" id="port" name="port" value="{port}" placeholder="9100">
  <label for="email">E-mail</label>
  <input type="email" id="email" name="email" value="{email}">
  <label><input type="checkbox" name="start_vortex"{checked}> Start worker automatically</label>
  <button type="submit">Save</button>
  <button type="button" class="danger" onclick="stopService()">Stop Service</button>
</form>
<div id="message"></div>
<p class="muted">Set Host to <code>0.0.0.0</code> to accept external worker connections.</p>"#
    );

    layout("Print Server Configuration", SCRIPT, &body)
}
