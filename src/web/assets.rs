//! Static asset serving

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

/// Serve the CSS stylesheet
pub async fn serve_css() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        CSS_CONTENT,
    )
}

const CSS_CONTENT: &str = r##"
:root {
  --background: 222 32% 10%;
  --foreground: 210 24% 96%;
  --card: 223 30% 14%;
  --card-foreground: 210 24% 96%;
  --primary: 197 85% 63%;
  --primary-foreground: 222 30% 11%;
  --secondary: 216 25% 22%;
  --secondary-foreground: 210 24% 96%;
  --accent: 217 24% 26%;
  --accent-foreground: 210 24% 96%;
  --muted: 217 24% 22%;
  --muted-foreground: 215 18% 70%;
  --destructive: 0 62% 47%;
  --destructive-foreground: 0 0% 100%;
  --border: 217 24% 30%;
  --row-even: 0 0% 88%;
  --radius: 12px;
}

* {
  box-sizing: border-box;
}

html,
body {
  margin: 0;
  min-height: 100%;
}

body {
  color: hsl(var(--foreground));
  background:
    radial-gradient(1200px 700px at 10% -20%, hsla(var(--primary), 0.18), transparent 50%),
    hsl(var(--background));
  font-family: "IBM Plex Sans", "Avenir Next", "Segoe UI", sans-serif;
  line-height: 1.4;
}

.scanner-root {
  min-height: 100vh;
  padding: 18px;
  display: flex;
  align-items: flex-start;
  justify-content: center;
}

.scanner-shell {
  width: min(860px, 100%);
  background: hsla(var(--card), 0.92);
  color: hsl(var(--card-foreground));
  border: 1px solid hsl(var(--border));
  border-radius: var(--radius);
  box-shadow: 0 18px 40px rgba(5, 16, 35, 0.15);
}

.scanner-header {
  border-bottom: 1px solid hsl(var(--border));
  padding: 20px 20px 16px;
}

.scanner-title {
  margin: 0;
  font-size: 1.4rem;
  font-weight: 700;
}

.scanner-subtitle,
.scanner-connected {
  margin: 6px 0 0;
  color: hsl(var(--muted-foreground));
  font-size: 0.92rem;
}

.scanner-content {
  padding: 18px 20px 20px;
  display: grid;
  gap: 12px;
}

.scanner-status {
  border: 1px solid hsl(var(--border));
  background: hsla(var(--muted), 0.55);
  border-radius: calc(var(--radius) - 4px);
  padding: 12px 14px;
}

.scanner-status.state-scanning,
.scanner-status[data-state="scanning"] {
  border-color: hsl(42 92% 48%);
  background: hsla(42 92% 48%, 0.15);
}

.scanner-status.state-ready,
.scanner-status[data-state="ready"] {
  border-color: hsl(148 67% 38%);
  background: hsla(148 67% 38%, 0.15);
}

.scanner-status.state-failed,
.scanner-status[data-state="failed"] {
  border-color: hsl(var(--destructive));
  background: hsla(var(--destructive), 0.12);
}

.scanner-status-title {
  margin: 0;
  font-size: 0.98rem;
}

.scanner-status-detail {
  margin-top: 4px;
  color: hsl(var(--muted-foreground));
  font-size: 0.86rem;
}

.scanner-actions {
  display: flex;
  flex-wrap: wrap;
  gap: 10px;
}

.plain-btn,
.scanner-action-btn {
  flex: 1;
  min-height: 40px;
  padding: 10px 12px;
  border-radius: calc(var(--radius) - 6px);
  border: 1px solid hsl(var(--border));
  background: hsla(var(--card), 0.9);
  color: hsl(var(--foreground));
  font-weight: 600;
  font-size: 0.9rem;
  cursor: pointer;
}

.plain-btn.primary {
  background: hsl(var(--primary));
  color: hsl(var(--primary-foreground));
  border-color: hsl(var(--primary));
}

.link-btn {
  display: inline-flex;
  align-items: center;
  justify-content: center;
  text-decoration: none;
}

.plain-btn:hover,
.scanner-action-btn:hover {
  filter: brightness(1.05);
}

.plain-btn:disabled {
  opacity: 0.45;
  cursor: not-allowed;
}

.network-list {
  max-height: 60vh;
  overflow: auto;
}

.network-table {
  width: 100%;
  border-collapse: collapse;
  font-size: 0.92rem;
}

.network-table th {
  text-align: left;
  padding: 8px 10px;
  border-bottom: 1px solid hsl(var(--border));
  color: hsl(var(--muted-foreground));
  font-weight: 600;
}

.network-table td {
  padding: 8px 10px;
}

.network-row.odd {
  background: transparent;
}

.network-row.even {
  background: hsla(var(--row-even), 0.08);
}

.network-ssid {
  font-weight: 600;
  max-width: 320px;
  overflow: hidden;
  text-overflow: ellipsis;
  white-space: nowrap;
}

.signal-cell {
  white-space: nowrap;
}

.signal-value {
  display: inline-block;
  min-width: 72px;
  color: hsl(var(--muted-foreground));
}

.signal-glyph {
  letter-spacing: -0.1em;
}

.network-badge {
  border-radius: 999px;
  border: 1px solid hsl(var(--border));
  padding: 2px 8px;
  font-size: 0.72rem;
}

.network-row[data-open="true"] .network-badge {
  border-color: hsl(42 92% 48%);
}

.empty-state {
  margin: 0;
  border: 1px dashed hsl(var(--border));
  background: hsla(var(--muted), 0.4);
  border-radius: calc(var(--radius) - 4px);
  padding: 18px;
  font-size: 0.9rem;
  color: hsl(var(--muted-foreground));
  text-align: center;
}

.scanner-footer {
  margin: 0;
  font-size: 0.84rem;
  color: hsl(var(--muted-foreground));
}

/* Light utility compatibility for shadcn defaults used by component internals. */
[class~="space-y-1"] > * + * {
  margin-top: 0.25rem;
}

[class~="text-destructive"] {
  color: hsl(var(--destructive));
}

@media (max-width: 640px) {
  .scanner-root {
    padding: 10px;
  }

  .scanner-header,
  .scanner-content {
    padding-left: 14px;
    padding-right: 14px;
  }

  .plain-btn,
  .scanner-action-btn {
    width: 100%;
  }
}
"##;
