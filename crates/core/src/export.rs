//! CSV export of upload history.

use crate::types::{DbId, Timestamp};

/// Header row of the upload-history export.
pub const CSV_HEADER: [&str; 5] = ["ID", "File path", "URL", "Size", "Created at"];

/// One exported line.
#[derive(Debug, Clone)]
pub struct ExportRow<'a> {
    pub id: DbId,
    pub file_path: Option<&'a str>,
    pub url: &'a str,
    pub size: Option<i64>,
    pub created_at: Timestamp,
}

/// Human-readable byte size: `B` below 1 KiB, then `KB`/`MB` with one decimal.
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < MB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / MB)
    }
}

/// Quote a CSV field, doubling embedded quotes.
pub fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render rows into a CSV document. Lines end with `\n`.
pub fn render_csv<'a>(rows: impl IntoIterator<Item = ExportRow<'a>>) -> String {
    let mut out = CSV_HEADER
        .iter()
        .map(|h| quote_field(h))
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for row in rows {
        let fields = [
            row.id.to_string(),
            row.file_path.unwrap_or_default().to_string(),
            row.url.to_string(),
            row.size.map(format_size).unwrap_or_default(),
            row.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ];
        let line = fields
            .iter()
            .map(|f| quote_field(f))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Download file name for an export generated at `now`.
pub fn export_file_name(now: Timestamp) -> String {
    format!("upload_history_{}.csv", now.format("%Y-%m-%d"))
}
