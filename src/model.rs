//! Data structures describing a planned report.
//!
//! A [`ReportPlan`] is the hand-off between the layout planner and whichever emitter draws it.
//! The types deliberately avoid referencing `genpdf`: a plan carries block kinds, text, column
//! widths in millimetres and the page each block was assigned to, which is enough for any drawing
//! backend (see [`crate::emitter`]).

/// Horizontal placement of header and signature text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Visual emphasis of a table cell. Emitters map tones to their own styling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Plain,
    /// Column headers and other labels.
    Strong,
    Approved,
    Pending,
    Rejected,
    /// Placeholder values such as `Not Assigned`.
    Muted,
}

/// One table cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    text: String,
    tone: Tone,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(text)
    }
}

/// A table column: its header text and width.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    header: String,
    width_mm: f64,
}

impl Column {
    pub fn new(header: impl Into<String>, width_mm: f64) -> Self {
        Self {
            header: header.into(),
            width_mm,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }
}

/// A titled table with explicit column widths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    title: Option<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: impl Into<Vec<Column>>) -> Self {
        Self {
            columns: columns.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::header)
    }

    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    /// Appends a row. Rows shorter than the column list are padded with empty cells, longer rows
    /// are truncated.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let mut row: Vec<Cell> = cells.into_iter().take(self.columns.len()).collect();
        row.resize_with(self.columns.len(), Cell::default);
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Title lines printed at the top of the first page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    institution: Option<String>,
    department: String,
    title: String,
    subtitle: Option<String>,
    logo_path: Option<String>,
}

impl DocumentHeader {
    pub fn new(department: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Image shown above the title lines, if configured.
    pub fn logo_path(&self) -> Option<&str> {
        self.logo_path.as_deref()
    }

    pub fn with_institution(mut self, institution: impl Into<Option<String>>) -> Self {
        self.institution = institution.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_logo_path(mut self, logo_path: impl Into<Option<String>>) -> Self {
        self.logo_path = logo_path.into();
        self
    }
}

/// Heading that opens a report section such as "Leave Requests".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionTitle {
    identifier: String,
    title: String,
}

impl SectionTitle {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
        }
    }

    /// Stable identifier used for bookmarks.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// The page a section heading ended up on in a rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionPage {
    pub section: SectionTitle,
    pub page: usize,
}

/// Signature lines at the end of a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureBlock {
    signatories: Vec<String>,
    alignment: HorizontalAlignment,
}

impl SignatureBlock {
    pub fn new<I, S>(signatories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signatories: signatories.into_iter().map(Into::into).collect(),
            alignment: HorizontalAlignment::Right,
        }
    }

    pub fn signatories(&self) -> &[String] {
        &self.signatories
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Generation stamp and page count. Emitters print `Page X of Y` on every page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footer {
    generated_on: String,
    page_count: usize,
}

impl Footer {
    pub fn new(generated_on: impl Into<String>, page_count: usize) -> Self {
        Self {
            generated_on: generated_on.into(),
            page_count,
        }
    }

    pub fn generated_on(&self) -> &str {
        &self.generated_on
    }

    /// `Generated on: <timestamp>`.
    pub fn generated_line(&self) -> String {
        format!("Generated on: {}", self.generated_on)
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// `Page X of Y` for the 1-indexed `page`.
    pub fn page_label(&self, page: usize) -> String {
        format!("Page {} of {}", page, self.page_count)
    }
}

/// Renderable content blocks, in the order they appear in a report.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Header(DocumentHeader),
    SectionTitle(SectionTitle),
    Table(DataTable),
    /// Shown instead of every section when nothing qualified.
    Placeholder(String),
    /// Explicit page break request.
    PageBreak,
    Signature(SignatureBlock),
    Footer(Footer),
}

impl Block {
    pub fn section_title(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self::SectionTitle(SectionTitle::new(identifier, title))
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Short name of the block kind, for logs and debugging output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::SectionTitle(_) => "section-title",
            Self::Table(_) => "table",
            Self::Placeholder(_) => "placeholder",
            Self::PageBreak => "page-break",
            Self::Signature(_) => "signature",
            Self::Footer(_) => "footer",
        }
    }
}

/// A block together with the position the planner assigned to it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBlock {
    page: usize,
    top_mm: f64,
    height_mm: f64,
    block: Block,
}

impl PlacedBlock {
    pub fn new(page: usize, top_mm: f64, height_mm: f64, block: Block) -> Self {
        Self {
            page,
            top_mm,
            height_mm,
            block,
        }
    }

    /// 1-indexed page the block starts on.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Offset from the top of the content area.
    pub fn top_mm(&self) -> f64 {
        self.top_mm
    }

    /// Estimated height of the block.
    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    pub fn block(&self) -> &Block {
        &self.block
    }
}

/// The complete, ordered description of one report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportPlan {
    filename: String,
    blocks: Vec<PlacedBlock>,
    page_count: usize,
}

impl ReportPlan {
    pub fn new(filename: impl Into<String>, blocks: Vec<PlacedBlock>, page_count: usize) -> Self {
        Self {
            filename: filename.into(),
            blocks,
            page_count,
        }
    }

    /// Suggested name for the emitted file.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn blocks(&self) -> &[PlacedBlock] {
        &self.blocks
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Iterates over the blocks without their placement.
    pub fn iter_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().map(PlacedBlock::block)
    }

    pub fn tables(&self) -> impl Iterator<Item = &DataTable> {
        self.iter_blocks().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Section titles with the page they start on.
    pub fn sections(&self) -> impl Iterator<Item = (&SectionTitle, usize)> {
        self.blocks
            .iter()
            .filter_map(|placed| match placed.block() {
                Block::SectionTitle(title) => Some((title, placed.page())),
                _ => None,
            })
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.iter_blocks().find_map(|block| match block {
            Block::Footer(footer) => Some(footer),
            _ => None,
        })
    }

    pub fn header(&self) -> Option<&DocumentHeader> {
        self.iter_blocks().find_map(|block| match block {
            Block::Header(header) => Some(header),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_and_truncated_to_the_columns() {
        let mut table = DataTable::new(vec![Column::new("A", 10.0), Column::new("B", 20.0)]);
        table.push_row(vec![Cell::new("only one")]);
        table.push_row(vec![Cell::new("1"), Cell::new("2"), Cell::new("3")]);

        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[0][1].text(), "");
        assert_eq!(table.rows()[1].len(), 2);
        assert_eq!(table.rows()[1][1].text(), "2");
    }

    #[test]
    fn footer_formats_labels() {
        let footer = Footer::new("01/03/2024 09:30", 3);
        assert_eq!(footer.generated_line(), "Generated on: 01/03/2024 09:30");
        assert_eq!(footer.page_label(2), "Page 2 of 3");
    }
}
