// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server-rendered HTML pages.  Every dynamic value passes through
// `escape_html` before it is interpolated.

pub mod config;
pub mod docs;
pub mod status;

/// Shared stylesheet for all pages.
const STYLE: &str = r#"<style>
  :root { --primary: #0078d4; --success: #107c10; --error: #d83b01; --muted: #605e5c; }
  * { box-sizing: border-box; }
  body { font-family: "Segoe UI", system-ui, sans-serif; margin: 0; background: #f3f2f1; color: #201f1e; }
  header { background: var(--primary); color: #fff; padding: 16px 24px; }
  header a { color: #fff; margin-right: 16px; text-decoration: none; }
  main { max-width: 760px; margin: 24px auto; background: #fff; padding: 24px; border-radius: 6px; }
  h1 { margin-top: 0; font-size: 1.4rem; }
  label { display: block; margin-top: 14px; font-weight: 600; }
  input[type=text], input[type=email] { width: 100%; padding: 8px; border: 1px solid #c8c6c4; border-radius: 4px; }
  button { margin-top: 18px; padding: 8px 18px; border: 0; border-radius: 4px; background: var(--primary); color: #fff; cursor: pointer; }
  button.danger { background: var(--error); }
  .badge { display: inline-block; padding: 2px 10px; border-radius: 10px; color: #fff; }
  .ok { background: var(--success); }
  .down { background: var(--error); }
  .muted { color: var(--muted); }
  dl { display: grid; grid-template-columns: 160px 1fr; gap: 8px 16px; }
  dt { font-weight: 600; }
  pre { background: #201f1e; color: #f3f2f1; padding: 12px; overflow-x: auto; max-height: 360px; }
  code { background: #f3f2f1; padding: 1px 4px; }
  #message { margin-top: 14px; }
</style>"#;

/// Wrap `body` in the common page chrome.
fn layout(title: &str, head_extra: &str, body: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
{head_extra}
{STYLE}
</head>
<body>
<header><a href="/config">Configuration</a><a href="/status">Status</a><a href="/printers">Printers</a><a href="/api/docs">API</a></header>
<main>
{body}
</main>
</body>
</html>
"#
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn layout_escapes_title() {
        let page = layout("<b>", "", "body");
        assert!(page.contains("<title>&lt;b&gt;</title>"));
    }
}
