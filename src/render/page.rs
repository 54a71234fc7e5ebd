use crate::db::EventRow;
use std::fmt::Write;

const HEADER: &str = "<h2>Data Event</h2><table border=\"1\"><tr><th>ID</th><th>Device ID</th><th>Event Type</th><th>Value</th><th>Timestamp</th></tr>";
const FOOTER: &str = "</table>";

/// Render rows as an HTML table, in the order given. Field values are
/// HTML-escaped.
pub fn render(rows: &[EventRow]) -> String {
    let mut html = String::with_capacity(HEADER.len() + FOOTER.len() + rows.len() * 96);
    html.push_str(HEADER);
    for row in rows {
        // Writing into a String cannot fail.
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.id,
            Escaped(&row.device_id),
            Escaped(&row.event_type),
            Escaped(&row.value),
            Escaped(&row.timestamp),
        );
    }
    html.push_str(FOOTER);
    html
}

struct Escaped<'a>(&'a str);

impl std::fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..pos])?;
            f.write_str(match rest.as_bytes()[pos] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[pos + 1..];
        }
        f.write_str(rest)
    }
}
