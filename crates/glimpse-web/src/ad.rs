//! Ad composition — the boundary between the visitor store and markup.
//!
//! Deliberately not a template engine: the adapter substitutes three named
//! placeholders into a template string and nothing more. Operators who want
//! different markup point `GLIMPSE_AD_TEMPLATE_PATH` at their own file.

use std::path::Path;

use glimpse_store::HistoryEntry;

const DEFAULT_AD_TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <title>Smart Ad</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 0; background: #0b1220; color: #e6edf3; }
    .wrap { display: grid; place-items: center; min-height: 100vh; }
    .card { background: #111b2a; padding: 32px; border-radius: 20px; width: min(720px, 92vw); }
    h1 { margin: 0 0 12px; }
    .muted { opacity: .7; }
    .pill { display: inline-block; padding: 6px 10px; border-radius: 999px; background: #1f2b41; font-size: 12px; }
    ul { line-height: 1.8; }
  </style>
</head>
<body>
  <div class="wrap">
    <div class="card">
      <div class="pill">anonymous member: {{member_id}}</div>
      <h1>Welcome back, {{headline}}!</h1>
      <p class="muted">Picked for you, based on your recent purchases:</p>
      <ul>
{{history_rows}}
      </ul>
      <p class="muted">Privacy preserved: only an irreversible anonymous ID is used.</p>
    </div>
  </div>
</body>
</html>
"#;

/// Ad page template with `{{member_id}}`, `{{headline}}` and
/// `{{history_rows}}` placeholders.
pub struct AdTemplate {
    source: String,
}

impl AdTemplate {
    /// Load an operator-supplied template, falling back to the built-in
    /// one when the path is unset or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let source = match path {
            Some(p) => match std::fs::read_to_string(p) {
                Ok(s) => {
                    tracing::info!(path = %p.display(), "loaded ad template");
                    s
                }
                Err(err) => {
                    tracing::warn!(path = %p.display(), error = %err, "falling back to built-in ad template");
                    DEFAULT_AD_TEMPLATE.to_string()
                }
            },
            None => DEFAULT_AD_TEMPLATE.to_string(),
        };
        Self { source }
    }

    /// Render the ad page for one visitor. Zero history entries render an
    /// empty list, not an error.
    pub fn render(&self, member_id: &str, history: &[HistoryEntry]) -> String {
        let rows: String = history
            .iter()
            .map(|entry| {
                format!(
                    "        <li>{} ×{} — bought {} ago. <strong>10% off today</strong></li>\n",
                    escape_html(&entry.sku),
                    entry.quantity,
                    entry.ago,
                )
            })
            .collect();

        self.source
            .replace("{{member_id}}", &escape_html(member_id))
            .replace("{{headline}}", &escape_html(&headline_for(member_id)))
            .replace("{{history_rows}}", rows.trim_end())
    }
}

/// Display headline: the identifier truncated to its first 8 characters.
pub fn headline_for(member_id: &str) -> String {
    member_id.chars().take(8).collect()
}

/// The member id arrives as an arbitrary query parameter and is echoed
/// into markup, so it must be escaped.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
