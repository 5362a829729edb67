// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static API reference served at `/api/docs`.

use super::layout;

const BODY: &str = r#"<h1>Printlink API</h1>

<h2>GET /printers</h2>
<p>Installed printers. Use <code>Id</code> (stable across renames of other printers) or <code>Name</code> as the <code>printer</code> field of a print job.</p>
<pre>[
  {
    "Id": "3f2a9c1e",
    "Name": "Receipt",
    "PortName": "socket://10.0.0.9:9100",
    "DriverName": "raw",
    "Location": "Front desk",
    "Comment": "",
    "ShareName": "Receipt",
    "Status": 0,
    "Attributes": 4,
    "IsDefault": true
  }
]</pre>

<h2>POST /print</h2>
<p>Body: <code>{"printer", "mode", "data", "logo", "logo_url"}</code>. <code>printer</code> and <code>data</code> are required; <code>mode</code> defaults to <code>text</code>.</p>
<dl>
  <dt>text</dt><dd>UTF-8 text sent as-is.</dd>
  <dt>raw</dt><dd>Base64 printer-language bytes (ESC/POS, ZPL, PCL...).</dd>
  <dt>pdf</dt><dd>Base64 PDF or an http(s) URL to one.</dd>
  <dt>image</dt><dd>Base64 image or an http(s) URL to one.</dd>
  <dt>logo_text</dt><dd>Receipt with a logo above the text. Requires <code>logo</code> (base64 or data URL) or <code>logo_url</code>.</dd>
</dl>
<pre>{"status": "ok", "printer": "Receipt", "mode": "text"}</pre>
<p>Errors: <code>400</code> invalid JSON, missing fields, bad mode or payload; <code>404</code> unknown printer; <code>500</code> print failure. Body: <code>{"error": "..."}</code>.</p>

<h2>GET /api/status</h2>
<p>Worker status.</p>
<pre>{
  "state": "running",
  "running": true,
  "last_start": "2026-01-15T09:12:01Z",
  "last_error": null,
  "restart_count": 5,
  "process_id": 4242,
  "last_output": ["connected"]
}</pre>

<h2>POST /config</h2>
<p>Body: any of <code>site</code>, <code>provider</code>, <code>host</code>, <code>port</code>, <code>email</code>, <code>start_vortex</code>. Saving restarts the worker.</p>
<pre>{"success": true}</pre>

<h2>POST /shutdown</h2>
<p>Stops the worker and the server.</p>
<pre>{"success": true, "message": "Services stopping..."}</pre>"#;

pub fn render() -> String {
    layout("Printlink API", "", BODY)
}
