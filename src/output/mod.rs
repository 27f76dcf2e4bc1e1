//! Markdown link summary over merged results

use crate::merge::MergedRecord;

/// Group label for records without a filename
pub const FALLBACK_GROUP: &str = "image";

const TABLE_HEADER: &str = "| Destination | Preview | Link |\n|------|------|------|";

pub struct SummaryFormatter;

impl SummaryFormatter {
    /// One `###` section per filename, in first-seen order, each with a
    /// `Destination | Preview | Link` table. Empty input renders as an empty string.
    pub fn render(records: &[MergedRecord]) -> String {
        let mut groups: Vec<(&str, Vec<&MergedRecord>)> = Vec::new();
        for record in records {
            let name = record
                .file_name()
                .filter(|name| !name.is_empty())
                .unwrap_or(FALLBACK_GROUP);
            match groups.iter_mut().find(|(group, _)| *group == name) {
                Some((_, members)) => members.push(record),
                None => groups.push((name, vec![record])),
            }
        }

        groups
            .iter()
            .map(|(name, members)| {
                let rows: Vec<String> = members.iter().map(|record| render_row(record)).collect();
                format!("### 🖼️ {}\n\n{}\n{}\n", name, TABLE_HEADER, rows.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_row(record: &MergedRecord) -> String {
    let url = record.url().unwrap_or_default();
    let tag = if record.uploader.is_empty() {
        "-"
    } else {
        record.uploader.as_str()
    };
    format!("| {} | ![]({}) | [{}]({}) |", tag, url, url, url)
}
