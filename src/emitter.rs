//! The seam between report plans and drawing backends.
//!
//! Anything that can turn a [`ReportPlan`] into bytes implements [`DocumentEmitter`]. The crate
//! ships the genpdf-backed [`crate::builder::PdfEmitter`] and the plain [`TextEmitter`] used for
//! terminal previews.

use std::fmt::Write as _;

use crate::error::ReportError;
use crate::model::{Block, DataTable, DocumentHeader, Footer, ReportPlan};

/// Draws a report plan into a complete file.
///
/// Implementations must not return partial output: on error nothing is written.
pub trait DocumentEmitter {
    fn emit(&self, plan: &ReportPlan) -> Result<Vec<u8>, ReportError>;

    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;

    /// The plan's suggested filename with this emitter's extension.
    fn filename_for(&self, plan: &ReportPlan) -> String {
        let name = plan.filename();
        let stem = name.strip_suffix(".pdf").unwrap_or(name);
        format!("{}.{}", stem, self.extension())
    }
}

/// Renders plans as fixed-width UTF-8 text.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextEmitter;

impl TextEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Renders the plan into a string.
    ///
    /// Page markers follow the planned placement of each block, so a table the planner let
    /// flow over several pages is followed by one marker per page it covered.
    pub fn render(&self, plan: &ReportPlan) -> String {
        let mut out = String::new();
        let page_count = plan.page_count();
        let mut page = 1;

        for placed in plan.blocks() {
            while page < placed.page() {
                write_page_marker(&mut out, page, page_count);
                page += 1;
            }

            match placed.block() {
                Block::Header(header) => write_header(&mut out, header),
                Block::SectionTitle(title) => {
                    let _ = writeln!(out, "== {} ==\n", title.title());
                }
                Block::Table(table) => write_table(&mut out, table),
                Block::Placeholder(text) => {
                    let _ = writeln!(out, "{}\n", text);
                }
                Block::PageBreak => {}
                Block::Signature(signature) => {
                    for signatory in signature.signatories() {
                        let line = "_".repeat(signatory.chars().count().max(20));
                        let _ = writeln!(out, "\n{:>60}\n{:>60}", line, signatory);
                    }
                    out.push('\n');
                }
                Block::Footer(footer) => write_footer(&mut out, footer, page),
            }
        }

        out
    }
}

impl DocumentEmitter for TextEmitter {
    fn emit(&self, plan: &ReportPlan) -> Result<Vec<u8>, ReportError> {
        Ok(self.render(plan).into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

fn write_header(out: &mut String, header: &DocumentHeader) {
    if let Some(institution) = header.institution() {
        let _ = writeln!(out, "{}", institution);
    }
    let _ = writeln!(out, "{}", header.department());
    let _ = writeln!(out, "{}", header.title());
    if let Some(subtitle) = header.subtitle() {
        let _ = writeln!(out, "{}", subtitle);
    }
    out.push('\n');
}

fn write_page_marker(out: &mut String, page: usize, page_count: usize) {
    let _ = writeln!(out, "--- Page {} of {} ---\n", page, page_count);
}

fn write_footer(out: &mut String, footer: &Footer, page: usize) {
    let _ = writeln!(out, "{}", footer.generated_line());
    let _ = writeln!(out, "--- {} ---", footer.page_label(page));
}

fn write_table(out: &mut String, table: &DataTable) {
    if let Some(title) = table.title() {
        let _ = writeln!(out, "{}", title);
    }

    let mut widths: Vec<usize> = table
        .headers()
        .map(|header| header.chars().count())
        .collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.text().chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "{}", line(table.headers().collect()));
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("-+-");
    let _ = writeln!(out, "{}", rule);
    for row in table.rows() {
        let _ = writeln!(out, "{}", line(row.iter().map(|cell| cell.text()).collect()));
    }
    out.push('\n');
}
