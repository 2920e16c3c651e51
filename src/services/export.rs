//! Offline exports of the workshop dataset: a spreadsheet (CSV with a
//! UTF-8 BOM so Excel opens it cleanly) and a one-line-per-workshop PDF
//! summary.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::{
    error::{Error, Result},
    models::workshops::ExportRow,
};

/// The PDF summary covers the 100 most recent workshops.
pub const PDF_SUMMARY_LIMIT: usize = 100;

/// Summary lines are cut at 110 characters, matching the page width.
pub const PDF_LINE_CHARS: usize = 110;

const PDF_TITLE: &str = "Semiconductor EdTech Workshops Summary";

// A4 portrait in points.
const PAGE_WIDTH: f32 = 595.276;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;
const LINE_HEIGHT: f32 = 15.0;

const SPREADSHEET_HEADERS: [&str; 15] = [
    "Title",
    "Topic",
    "Start Date",
    "End Date",
    "Mode",
    "City",
    "Institute",
    "State",
    "Coordinator",
    "Email",
    "Phone",
    "Status",
    "Participants",
    "Category",
    "Registration Link",
];

/// Renders the spreadsheet export: a header row plus one row per workshop.
pub fn render_spreadsheet(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    // UTF-8 BOM for Excel compatibility
    out.extend_from_slice(b"\xEF\xBB\xBF");

    let mut writer = csv::Writer::from_writer(&mut out);
    writer
        .write_record(SPREADSHEET_HEADERS)
        .map_err(|e| Error::Internal(format!("Failed to write spreadsheet header: {}", e)))?;

    for row in rows {
        let start_date = row.start_date.to_string();
        let end_date = row.end_date.map(|d| d.to_string()).unwrap_or_default();
        let participants = row.participants_count.to_string();
        writer
            .write_record([
                row.title.as_str(),
                row.topic.as_str(),
                start_date.as_str(),
                end_date.as_str(),
                row.mode.label(),
                row.city.as_str(),
                row.institute.as_str(),
                row.state.as_str(),
                row.coordinator_name.as_str(),
                row.coordinator_email.as_str(),
                row.coordinator_phone.as_str(),
                row.status.label(),
                participants.as_str(),
                row.category.as_str(),
                row.registration_link.as_str(),
            ])
            .map_err(|e| Error::Internal(format!("Failed to write spreadsheet row: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Internal(format!("Failed to flush spreadsheet: {}", e)))?;
    drop(writer);

    Ok(out)
}

/// One summary line: `{date} - {title} ({status}) - {city or state or institute}`.
pub fn summary_line(row: &ExportRow) -> String {
    format!(
        "{} - {} ({}) - {}",
        row.start_date,
        row.title,
        row.status.label(),
        row.place()
    )
}

/// Cuts a string at `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Renders the PDF summary document.
///
/// A bold heading on the first page, then one 10 pt Helvetica line per
/// workshop (at most [`PDF_SUMMARY_LIMIT`]), flowing onto a new page
/// whenever the bottom margin is reached.
pub fn render_summary_pdf(rows: &[ExportRow]) -> Vec<u8> {
    let mut page_streams: Vec<Vec<u8>> = Vec::new();
    let mut content = Content::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    content.begin_text();
    content.set_font(Name(b"F2"), 14.0);
    content.next_line(MARGIN, y);
    content.show(Str(PDF_TITLE.as_bytes()));
    content.end_text();
    y -= 30.0;

    for row in rows.iter().take(PDF_SUMMARY_LIMIT) {
        let line = summary_line(row);
        let line = truncate_chars(&line, PDF_LINE_CHARS);

        content.begin_text();
        content.set_font(Name(b"F1"), 10.0);
        content.next_line(MARGIN, y);
        content.show(Str(line.as_bytes()));
        content.end_text();
        y -= LINE_HEIGHT;

        if y < MARGIN {
            page_streams.push(content.finish());
            content = Content::new();
            y = PAGE_HEIGHT - MARGIN;
        }
    }
    page_streams.push(content.finish());

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let font_regular_id = Ref::new(3);
    let font_bold_id = Ref::new(4);

    let mut next_id = 5;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };
    let ids: Vec<(Ref, Ref)> = page_streams.iter().map(|_| (alloc(), alloc())).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(ids.iter().map(|(page_id, _)| *page_id))
        .count(ids.len() as i32);
    pdf.type1_font(font_regular_id).base_font(Name(b"Helvetica"));
    pdf.type1_font(font_bold_id).base_font(Name(b"Helvetica-Bold"));

    for ((page_id, content_id), stream) in ids.iter().zip(&page_streams) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(*content_id);
        {
            let mut resources = page.resources();
            let mut fonts = resources.fonts();
            fonts.pair(Name(b"F1"), font_regular_id);
            fonts.pair(Name(b"F2"), font_bold_id);
        }
        page.finish();
        pdf.stream(*content_id, stream);
    }

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workshops::{Mode, WorkshopStatus};
    use chrono::NaiveDate;

    fn row(title: &str, city: &str, state: &str, institute: &str) -> ExportRow {
        ExportRow {
            title: title.to_string(),
            topic: "Fabrication".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12),
            mode: Mode::Physical,
            city: city.to_string(),
            state: state.to_string(),
            institute: institute.to_string(),
            coordinator_name: "Asha Rao".to_string(),
            coordinator_email: "asha@example.com".to_string(),
            coordinator_phone: "9876543210".to_string(),
            status: WorkshopStatus::Completed,
            participants_count: 42,
            category: "Faculty".to_string(),
            registration_link: "https://example.com/register".to_string(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_spreadsheet_row_count_matches_input() {
        let rows: Vec<ExportRow> = (0..7).map(|i| row(&format!("W{i}"), "Pune", "", "")).collect();
        let bytes = render_spreadsheet(&rows).unwrap();

        // Skip the BOM before handing the bytes back to the csv reader.
        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            SPREADSHEET_HEADERS.to_vec()
        );
        assert_eq!(reader.records().count(), rows.len());
    }

    #[test]
    fn test_spreadsheet_uses_display_labels() {
        let bytes = render_spreadsheet(&[row("Photolithography", "Pune", "", "")]).unwrap();
        assert!(contains(&bytes, b"Physical"));
        assert!(contains(&bytes, b"Completed"));
        assert!(contains(&bytes, b"Asha Rao"));
    }

    #[test]
    fn test_summary_line_place_fallback() {
        assert!(summary_line(&row("W", "Delhi", "Haryana", "X")).ends_with("- Delhi"));
        assert!(summary_line(&row("W", "", "Haryana", "X")).ends_with("- Haryana"));
        assert!(summary_line(&row("W", "", "", "IIT Delhi")).ends_with("- IIT Delhi"));
    }

    #[test]
    fn test_summary_line_format() {
        let line = summary_line(&row("Chip Design 101", "Delhi", "", ""));
        assert_eq!(line, "2025-03-10 - Chip Design 101 (Completed) - Delhi");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
        // 3 two-byte characters; cutting at 2 must not split a code point.
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }

    #[test]
    fn test_pdf_emits_at_most_100_lines() {
        let rows: Vec<ExportRow> = (0..120)
            .map(|i| row(&format!("UniqueTitle{i:03}"), "Pune", "", ""))
            .collect();
        let bytes = render_summary_pdf(&rows);

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"UniqueTitle000"));
        assert!(contains(&bytes, b"UniqueTitle099"));
        assert!(!contains(&bytes, b"UniqueTitle100"));
        assert!(!contains(&bytes, b"UniqueTitle119"));
    }

    #[test]
    fn test_pdf_renders_with_no_rows() {
        let bytes = render_summary_pdf(&[]);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, PDF_TITLE.as_bytes()));
    }
}
