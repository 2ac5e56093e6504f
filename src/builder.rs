//! genpdf document construction and the PDF [`DocumentEmitter`].

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::Rc;

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{self, Style};
use genpdf::{self, Alignment, Element, Margins, Mm, PageDecorator, Position, RenderResult, Size};
use log::{debug, warn};

use crate::config::{PaperSize, ReportConfig};
use crate::elements::{logo_from_path, mm_from_f64, SignatureLine};
use crate::emitter::DocumentEmitter;
use crate::error::ReportError;
use crate::fonts;
use crate::model::{
    Block, DataTable, DocumentHeader, Footer, ReportPlan, SectionPage, SectionTitle,
    SignatureBlock,
};
use crate::richtext::Span;

const BODY_FONT_SIZE: u8 = 10;
const TABLE_FONT_SIZE: u8 = 8;
const LOGO_WIDTH_MM: f64 = 22.0;
const CELL_PADDING_MM: f64 = 1.0;

/// Builder for `genpdf::Document` instances pre-configured with the crate defaults.
#[derive(Default)]
pub struct DocumentBuilder {
    paper_size: Option<Size>,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
    font_family: Option<FontFamily<FontData>>,
    title: Option<String>,
    page_counter: Option<Rc<Cell<usize>>>,
}

type FooterFactory = dyn Fn(usize) -> Box<dyn Element>;

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size used for newly created documents.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = Some(paper_size.into());
        self
    }

    /// Sets the margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = Some(margins.into());
        self
    }

    /// Configures a footer callback with a fixed height that is invoked for every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Uses `family` instead of searching for the default fonts.
    pub fn with_font_family(mut self, family: FontFamily<FontData>) -> Self {
        self.font_family = Some(family);
        self
    }

    /// Sets the PDF document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Publishes the number of the page being laid out into `counter`.
    pub fn with_page_counter(mut self, counter: Rc<Cell<usize>>) -> Self {
        self.page_counter = Some(counter);
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = match self.font_family {
            Some(family) => family,
            None => fonts::default_font_family()?,
        };
        let mut document = genpdf::Document::new(font_family);
        document.set_font_size(BODY_FONT_SIZE);

        if let Some(paper_size) = self.paper_size {
            document.set_paper_size(paper_size);
        }
        if let Some(title) = self.title {
            document.set_title(title);
        }

        let decorator = ConfiguredPageDecorator::new(self.margins, self.footer, self.page_counter);
        document.set_page_decorator(decorator);

        Ok(document)
    }
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<FooterFactory>,
}

impl FooterSpec {
    /// Creates a new footer specification.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ConfiguredPageDecorator {
    page: usize,
    margins: Option<Margins>,
    footer: Option<FooterSpec>,
    counter: Option<Rc<Cell<usize>>>,
}

impl ConfiguredPageDecorator {
    fn new(
        margins: Option<Margins>,
        footer: Option<FooterSpec>,
        counter: Option<Rc<Cell<usize>>>,
    ) -> Self {
        Self {
            page: 0,
            margins,
            footer,
            counter,
        }
    }
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        if let Some(counter) = &self.counter {
            counter.set(self.page);
        }

        if let Some(margins) = self.margins {
            area.add_margins(margins);
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(self.page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}

/// Result of rendering a report to PDF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// Number of pages genpdf laid out.
    pub page_count: usize,
    /// Page each section heading was drawn on, in document order.
    pub sections: Vec<SectionPage>,
    /// The `Page X of Y` line printed on each page.
    pub page_labels: Vec<String>,
}

/// State shared between the page decorator and section markers during one layout.
#[derive(Clone, Default)]
struct LayoutTracker {
    page: Rc<Cell<usize>>,
    sections: Rc<RefCell<Vec<SectionPage>>>,
    labels: Rc<RefCell<Vec<String>>>,
}

impl LayoutTracker {
    fn pages(&self) -> usize {
        self.page.get()
    }

    fn sections(&self) -> Vec<SectionPage> {
        self.sections.borrow().clone()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }
}

/// Wraps a section heading and records the page it is first drawn on.
struct SectionMarker<E> {
    inner: E,
    section: Option<SectionTitle>,
    tracker: LayoutTracker,
}

impl<E: Element> Element for SectionMarker<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: genpdf::render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if result.size.height > Mm::default() {
            if let Some(section) = self.section.take() {
                let page = self.tracker.pages();
                self.tracker
                    .sections
                    .borrow_mut()
                    .push(SectionPage { section, page });
            }
        }
        Ok(result)
    }
}

/// Draws report plans with genpdf.
///
/// Every page gets a centred `Page X of Y` line in the reserved footer area. Header, tables,
/// signature and the `Generated on` line are drawn in plan order.
#[derive(Clone, Debug)]
pub struct PdfEmitter {
    paper_size: PaperSize,
    margin_mm: f64,
    footer_reserve_mm: f64,
}

impl PdfEmitter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            paper_size: config.paper_size(),
            margin_mm: config.margin_mm(),
            footer_reserve_mm: config.footer_reserve_mm(),
        }
    }

    /// Renders the plan into PDF bytes.
    ///
    /// The planner's page count is an estimate, so the first layout counts the real pages and
    /// the document is drawn again whenever the printed totals would be off.
    pub fn render(&self, plan: &ReportPlan) -> Result<RenderedPdf, ReportError> {
        let family = fonts::default_font_family().map_err(ReportError::FontLoad)?;
        let estimated = plan.page_count();
        let first = self.render_pass(plan, family.clone(), estimated)?;
        if first.page_count == estimated {
            return Ok(first);
        }

        debug!(
            "planned {} pages but the layout needs {}, rendering again",
            estimated, first.page_count
        );
        let second = self.render_pass(plan, family, first.page_count)?;
        if second.page_count != first.page_count {
            return Err(ReportError::Render(Error::new(
                format!(
                    "page count changed between layouts ({} then {})",
                    first.page_count, second.page_count
                ),
                ErrorKind::InvalidData,
            )));
        }
        Ok(second)
    }

    /// Renders the plan and adds one outline entry per report section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self, plan: &ReportPlan) -> Result<RenderedPdf, ReportError> {
        let rendered = self.render(plan)?;
        let bytes = crate::bookmarks::apply_section_bookmarks(&rendered.bytes, &rendered.sections)?;
        Ok(RenderedPdf { bytes, ..rendered })
    }

    fn render_pass(
        &self,
        plan: &ReportPlan,
        family: FontFamily<FontData>,
        page_total: usize,
    ) -> Result<RenderedPdf, ReportError> {
        let tracker = LayoutTracker::default();
        let mut document = self
            .document_builder(plan, page_total, &tracker)
            .with_font_family(family)
            .with_page_counter(Rc::clone(&tracker.page))
            .build()
            .map_err(ReportError::FontLoad)?;

        for block in plan.iter_blocks() {
            debug!("rendering {} block", block.kind());
            push_block(&mut document, block, &tracker)?;
        }

        let mut buffer = Cursor::new(Vec::new());
        document.render(&mut buffer).map_err(ReportError::Render)?;
        Ok(RenderedPdf {
            bytes: buffer.into_inner(),
            page_count: tracker.pages(),
            sections: tracker.sections(),
            page_labels: tracker.labels(),
        })
    }

    fn document_builder(
        &self,
        plan: &ReportPlan,
        page_total: usize,
        tracker: &LayoutTracker,
    ) -> DocumentBuilder {
        let (width, height) = self.paper_size.dimensions_mm();
        let labels = Rc::clone(&tracker.labels);

        let mut builder = DocumentBuilder::new()
            .with_paper_size(Size::new(mm_from_f64(width), mm_from_f64(height)))
            .with_margins(Margins::all(mm_from_f64(self.margin_mm)))
            .with_footer(mm_from_f64(self.footer_reserve_mm), move |page| {
                let label = page_label(page, page_total);
                labels.borrow_mut().push(label.clone());
                let mut paragraph = Paragraph::new(label);
                paragraph.set_alignment(Alignment::Center);
                paragraph.styled(Style::new().with_font_size(TABLE_FONT_SIZE))
            });

        if let Some(header) = plan.header() {
            builder = builder.with_title(format!("{} - {}", header.department(), header.title()));
        }
        builder
    }
}

impl DocumentEmitter for PdfEmitter {
    fn emit(&self, plan: &ReportPlan) -> Result<Vec<u8>, ReportError> {
        self.render(plan).map(|rendered| rendered.bytes)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

fn page_label(page: usize, page_total: usize) -> String {
    format!("Page {} of {}", page, page_total)
}

fn push_block(
    document: &mut genpdf::Document,
    block: &Block,
    tracker: &LayoutTracker,
) -> Result<(), ReportError> {
    match block {
        Block::Header(header) => document.push(header_element(header)),
        Block::SectionTitle(title) => {
            let heading =
                Paragraph::new(title.title()).styled(Style::new().bold().with_font_size(13));
            let marker = SectionMarker {
                inner: heading,
                section: Some(title.clone()),
                tracker: tracker.clone(),
            };
            document.push(marker.padded(Margins::trbl(2, 0, 2, 0)));
        }
        Block::Table(table) => {
            if let Some(title) = table.title() {
                document.push(
                    Paragraph::new(title)
                        .styled(Style::new().bold().with_font_size(BODY_FONT_SIZE))
                        .padded(Margins::trbl(1, 0, 1, 0)),
                );
            }
            document.push(table_element(table)?);
            document.push(Break::new(1));
        }
        Block::Placeholder(text) => {
            let mut paragraph = Paragraph::new(text.as_str());
            paragraph.set_alignment(Alignment::Center);
            document.push(
                paragraph
                    .styled(Style::new().italic().with_font_size(12))
                    .padded(Margins::trbl(4, 0, 4, 0)),
            );
        }
        Block::PageBreak => document.push(PageBreak::new()),
        Block::Signature(signature) => document.push(signature_element(signature)),
        Block::Footer(footer) => document.push(footer_element(footer)),
    }
    Ok(())
}

fn header_element(header: &DocumentHeader) -> LinearLayout {
    let mut layout = LinearLayout::vertical();

    if let Some(path) = header.logo_path() {
        match logo_from_path(path, LOGO_WIDTH_MM, Alignment::Center) {
            Ok(image) => layout.push(image),
            Err(err) => warn!("skipping logo {}: {}", path, err),
        }
    }

    let centered = |text: &str, style: Style| {
        let mut paragraph = Paragraph::new(text);
        paragraph.set_alignment(Alignment::Center);
        paragraph.styled(style)
    };

    if let Some(institution) = header.institution() {
        layout.push(centered(institution, Style::new().bold().with_font_size(14)));
    }
    layout.push(centered(header.department(), Style::new().bold().with_font_size(12)));
    layout.push(centered(header.title(), Style::new().bold().with_font_size(16)));
    if let Some(subtitle) = header.subtitle() {
        layout.push(centered(subtitle, Style::new().with_font_size(11)));
    }
    layout.push(Break::new(1));
    layout
}

/// Column weights proportional to the planned widths, at 0.1 mm resolution.
fn column_weights(table: &DataTable) -> Vec<usize> {
    table
        .columns()
        .iter()
        .map(|column| ((column.width_mm() * 10.0).round() as usize).max(1))
        .collect()
}

fn cell_element(span: Span) -> impl Element {
    Paragraph::new(span.to_styled_string()).padded(Margins::all(mm_from_f64(CELL_PADDING_MM)))
}

fn push_row<I>(layout: &mut TableLayout, cells: I) -> Result<(), ReportError>
where
    I: IntoIterator<Item = Span>,
{
    let mut row = layout.row();
    for span in cells {
        row.push_element(cell_element(span));
    }
    row.push().map_err(ReportError::Render)
}

fn table_element(table: &DataTable) -> Result<impl Element, ReportError> {
    let mut layout = TableLayout::new(column_weights(table));
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    push_row(&mut layout, table.headers().map(|name| Span::new(name).bold()))?;
    for row in table.rows() {
        push_row(&mut layout, row.iter().map(Span::from_cell))?;
    }

    Ok(layout.styled(Style::new().with_font_size(TABLE_FONT_SIZE)))
}

fn signature_element(signature: &SignatureBlock) -> LinearLayout {
    let mut layout = LinearLayout::vertical();
    layout.push(Break::new(1));
    for signatory in signature.signatories() {
        layout.push(SignatureLine::new(signatory.as_str()).with_alignment(signature.alignment()));
    }
    layout
}

fn footer_element(footer: &Footer) -> impl Element {
    let mut layout = LinearLayout::vertical();
    layout.push(Break::new(1));
    layout.push(
        Paragraph::new(footer.generated_line())
            .styled(Style::new().italic().with_font_size(TABLE_FONT_SIZE)),
    );
    layout
}
