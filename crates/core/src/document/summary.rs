//! Summary PDF rendering.
//!
//! Produces a plain, paginated, single-font PDF 1.4 listing the file's
//! metadata and item lines, with signature lines at the end. Text outside
//! printable ASCII is replaced with `?` since only the standard Courier
//! encoding is referenced.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const LINES_PER_PAGE: usize = 56;
const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 40;
const LEADING: u32 = 13;

/// Data rendered into the summary PDF.
#[derive(Debug, Clone)]
pub struct SummaryDocument {
    /// Original spreadsheet name.
    pub filename: String,
    /// Channel name.
    pub channel: String,
    /// Uploader username.
    pub uploaded_by: String,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Approving manager username, if known.
    pub approved_by: Option<String>,
    /// Approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Sum of item amounts.
    pub total_amount: Decimal,
    /// Item lines in spreadsheet order.
    pub lines: Vec<SummaryLine>,
}

/// One budget item in the summary.
#[derive(Debug, Clone)]
pub struct SummaryLine {
    /// Spreadsheet row number.
    pub row_number: i32,
    /// Budget code.
    pub budget_code: String,
    /// Campaign name.
    pub campaign_name: String,
    /// Vendor.
    pub vendor: Option<String>,
    /// Planned amount.
    pub amount_planned: Decimal,
}

impl SummaryDocument {
    fn text_lines(&self) -> Vec<String> {
        let mut out = vec![
            "BUDGET APPROVAL SUMMARY".to_string(),
            String::new(),
            format!("File:        {}", self.filename),
            format!("Channel:     {}", self.channel),
            format!(
                "Uploaded by: {} on {}",
                self.uploaded_by,
                self.uploaded_at.format("%Y-%m-%d %H:%M")
            ),
        ];
        if let Some(manager) = &self.approved_by {
            let when = self
                .approved_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            out.push(format!("Approved by: {manager} on {when}"));
        }
        out.push(format!(
            "Items:       {}    Total: {}",
            self.lines.len(),
            self.total_amount
        ));
        out.push(String::new());
        out.push(format!(
            "{:>5}  {:<14} {:<34} {:<18} {:>14}",
            "Row", "Code", "Campaign", "Vendor", "Amount"
        ));
        out.push("-".repeat(89));
        for line in &self.lines {
            out.push(format!(
                "{:>5}  {:<14} {:<34} {:<18} {:>14}",
                line.row_number,
                clip(&line.budget_code, 14),
                clip(&line.campaign_name, 34),
                clip(line.vendor.as_deref().unwrap_or(""), 18),
                line.amount_planned
            ));
        }
        out.push(String::new());
        out.push(String::new());
        out.push("Prepared by: ____________________    Date: ____________".to_string());
        out.push(String::new());
        out.push("Approved by: ____________________    Date: ____________".to_string());
        out
    }
}

/// Render the summary as PDF bytes.
#[must_use]
pub fn render_summary_pdf(doc: &SummaryDocument) -> Vec<u8> {
    let lines = doc.text_lines();
    let pages: Vec<&[String]> = lines.chunks(LINES_PER_PAGE).collect();

    // 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let mut pdf = PdfWriter::new(3 + 2 * pages.len());

    pdf.object(1, "<< /Type /Catalog /Pages 2 0 R >>");
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();
    pdf.object(
        2,
        &format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );
    pdf.object(
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Courier /Encoding /WinAnsiEncoding >>",
    );

    for (page, id) in pages.iter().zip(&page_ids) {
        let content_id = id + 1;
        pdf.object(
            *id,
            &format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
            ),
        );
        pdf.stream(content_id, &page_content(page));
    }

    pdf.finish()
}

fn page_content(lines: &[String]) -> String {
    let mut content = format!(
        "BT\n/F1 9 Tf\n{LEADING} TL\n{MARGIN} {} Td\n",
        PAGE_HEIGHT - MARGIN
    );
    for line in lines {
        content.push('(');
        content.push_str(&escape(line));
        content.push_str(") Tj T*\n");
    }
    content.push_str("ET");
    content
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut s: String = value.chars().take(width.saturating_sub(1)).collect();
        s.push('~');
        s
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Minimal object writer; tracks byte offsets for the xref table.
struct PdfWriter {
    buf: String,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new(object_count: usize) -> Self {
        Self {
            buf: "%PDF-1.4\n".to_string(),
            offsets: vec![0; object_count],
        }
    }

    fn object(&mut self, id: usize, body: &str) {
        self.offsets[id - 1] = self.buf.len();
        self.buf.push_str(&format!("{id} 0 obj\n{body}\nendobj\n"));
    }

    fn stream(&mut self, id: usize, content: &str) {
        self.object(
            id,
            &format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ),
        );
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        self.buf
            .push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1));
        for offset in &self.offsets {
            self.buf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        self.buf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            self.offsets.len() + 1
        ));
        self.buf.into_bytes()
    }
}
