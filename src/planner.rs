//! Turns snapshots into paginated report plans.
//!
//! The planner never touches a drawing library. It estimates how tall each block will be, keeps
//! a cursor down the page and inserts explicit page breaks, so emitters only have to draw blocks
//! in order. Height estimates err on the generous side so a real renderer rarely needs to break a
//! page the plan did not ask for.

use chrono::NaiveDate;
use log::{debug, info};

use crate::config::ReportConfig;
use crate::dates::{self, DateRange};
use crate::grouping::{self, RequestGroup};
use crate::model::{
    Block, Cell, Column, DataTable, DocumentHeader, Footer, PlacedBlock, ReportPlan,
    SignatureBlock, Tone,
};
use crate::records::{Approval, Defaulter, Request, Snapshot, Staff, Stage, Status};

/// Text of the block that replaces all sections when nothing qualified.
pub const NO_REQUESTS_FOUND: &str = "No Requests Found";
/// Staff cell text when the request has no staff member for that stage.
pub const NOT_ASSIGNED: &str = "Not Assigned";

const HEADER_LINE_MM: f64 = 8.0;
const HEADER_TITLE_MM: f64 = 10.0;
const LOGO_MM: f64 = 22.0;
const SECTION_TITLE_MM: f64 = 10.0;
const TABLE_TITLE_MM: f64 = 7.0;
const LINE_MM: f64 = 5.0;
const ROW_PADDING_MM: f64 = 2.0;
const CELL_PADDING_MM: f64 = 2.0;
const AVERAGE_GLYPH_MM: f64 = 1.9;
const BLOCK_GAP_MM: f64 = 4.0;
const PLACEHOLDER_MM: f64 = 14.0;
const SIGNATURE_LINE_MM: f64 = 14.0;
const SIGNATURE_BASE_MM: f64 = 12.0;
const FOOTER_MM: f64 = 8.0;

const LEAVE_COLUMNS: &[(&str, f64)] = &[
    ("S.No", 10.0),
    ("Name", 30.0),
    ("Roll No", 22.0),
    ("From", 18.0),
    ("To", 18.0),
    ("Reason", 28.0),
    ("Mentor", 20.0),
    ("Class Incharge", 20.0),
    ("Status", 14.0),
];

const OD_COLUMNS: &[(&str, f64)] = &[
    ("S.No", 10.0),
    ("Name", 30.0),
    ("Roll No", 22.0),
    ("From", 18.0),
    ("To", 18.0),
    ("Purpose", 28.0),
    ("Mentor", 20.0),
    ("Class Incharge", 20.0),
    ("Status", 14.0),
];

const DEFAULTER_COLUMNS: &[(&str, f64)] = &[
    ("S.No", 10.0),
    ("Name", 35.0),
    ("Roll No", 25.0),
    ("Batch", 25.0),
    ("Section", 20.0),
    ("Type", 25.0),
    ("Remarks", 40.0),
];

const PENDING_COLUMNS: &[(&str, f64)] = &[
    ("S.No", 10.0),
    ("Type", 12.0),
    ("Name", 30.0),
    ("Roll No", 22.0),
    ("Section", 16.0),
    ("From", 18.0),
    ("To", 18.0),
    ("Mentor", 27.0),
    ("Class Incharge", 27.0),
];

/// Renders a staff assignment cell.
///
/// No staff member gives `Not Assigned`. Otherwise the name is shown, followed by ` (pending)`
/// while that stage has not approved or rejected the request.
pub fn staff_cell_text(staff: Option<&Staff>, approval: Option<&Approval>) -> String {
    let Some(staff) = staff else {
        return NOT_ASSIGNED.to_string();
    };
    match approval.map(|approval| approval.status) {
        Some(Status::Approved) | Some(Status::Rejected) => staff.name.clone(),
        Some(Status::Pending) | Some(Status::Unknown) | None => {
            format!("{} (pending)", staff.name)
        }
    }
}

fn staff_cell(staff: Option<&Staff>, approval: Option<&Approval>) -> Cell {
    let tone = match (staff, approval.map(|approval| approval.status)) {
        (None, _) => Tone::Muted,
        (Some(_), Some(Status::Approved)) => Tone::Approved,
        (Some(_), Some(Status::Rejected)) => Tone::Rejected,
        (Some(_), _) => Tone::Pending,
    };
    Cell::new(staff_cell_text(staff, approval)).with_tone(tone)
}

fn status_cell(status: Status) -> Cell {
    let tone = match status {
        Status::Approved => Tone::Approved,
        Status::Pending => Tone::Pending,
        Status::Rejected => Tone::Rejected,
        Status::Unknown => Tone::Muted,
    };
    Cell::new(status.label()).with_tone(tone)
}

fn reason_text(request: &Request) -> String {
    if request.medical {
        format!("{} (Medical)", request.reason)
    } else {
        request.reason.clone()
    }
}

fn scaled_columns(spec: &[(&str, f64)], width_mm: f64) -> Vec<Column> {
    let total: f64 = spec.iter().map(|(_, weight)| weight).sum();
    let scale = if total > 0.0 { width_mm / total } else { 0.0 };
    spec.iter()
        .map(|(header, weight)| Column::new(*header, weight * scale))
        .collect()
}

fn wrapped_lines(text: &str, width_mm: f64) -> usize {
    let usable = (width_mm - CELL_PADDING_MM).max(AVERAGE_GLYPH_MM);
    let chars = text.chars().count() as f64;
    ((chars * AVERAGE_GLYPH_MM / usable).ceil() as usize).max(1)
}

fn row_height<'a>(texts: impl Iterator<Item = &'a str>, columns: &[Column]) -> f64 {
    let lines = texts
        .zip(columns)
        .map(|(text, column)| wrapped_lines(text, column.width_mm()))
        .max()
        .unwrap_or(1);
    lines as f64 * LINE_MM + ROW_PADDING_MM
}

/// Estimated rendered height of a table, including its title.
pub fn table_height(table: &DataTable) -> f64 {
    let title = if table.title().is_some() {
        TABLE_TITLE_MM
    } else {
        0.0
    };
    let header = row_height(table.headers(), table.columns());
    let rows: f64 = table
        .rows()
        .iter()
        .map(|row| row_height(row.iter().map(Cell::text), table.columns()))
        .sum();
    title + header + rows
}

/// Height of the table's title, header row and first row; a section title is never left at the
/// bottom of a page without at least this much of its table.
fn table_lead_height(table: &DataTable) -> f64 {
    let title = if table.title().is_some() {
        TABLE_TITLE_MM
    } else {
        0.0
    };
    let header = row_height(table.headers(), table.columns());
    let first = table
        .rows()
        .first()
        .map(|row| row_height(row.iter().map(Cell::text), table.columns()))
        .unwrap_or(0.0);
    title + header + first
}

fn header_height(header: &DocumentHeader) -> f64 {
    let mut height = HEADER_TITLE_MM + HEADER_LINE_MM;
    if header.institution().is_some() {
        height += HEADER_LINE_MM;
    }
    if header.subtitle().is_some() {
        height += HEADER_LINE_MM;
    }
    if header.logo_path().is_some() {
        height += LOGO_MM;
    }
    height
}

fn signature_height(signature: &SignatureBlock) -> f64 {
    SIGNATURE_BASE_MM + SIGNATURE_LINE_MM * signature.signatories().len().max(1) as f64
}

/// Cursor state while blocks are being placed.
struct Layout {
    page_height: f64,
    page: usize,
    cursor: f64,
    blocks: Vec<PlacedBlock>,
}

impl Layout {
    fn new(page_height: f64) -> Self {
        Self {
            page_height,
            page: 1,
            cursor: 0.0,
            blocks: Vec::new(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= f64::EPSILON
    }

    fn gap(&self) -> f64 {
        if self.at_page_top() {
            0.0
        } else {
            BLOCK_GAP_MM
        }
    }

    fn remaining(&self) -> f64 {
        (self.page_height - self.cursor).max(0.0)
    }

    fn break_page(&mut self) {
        self.blocks.push(PlacedBlock::new(
            self.page,
            self.cursor,
            0.0,
            Block::PageBreak,
        ));
        self.page += 1;
        self.cursor = 0.0;
    }

    /// Places `block`, breaking first when `required` more millimetres would overflow the page.
    fn place_keeping(&mut self, block: Block, height: f64, required: f64) {
        if !self.at_page_top() && self.cursor + self.gap() + required > self.page_height {
            self.break_page();
        }
        self.push(block, height);
    }

    fn place(&mut self, block: Block, height: f64) {
        self.place_keeping(block, height, height);
    }

    fn push(&mut self, block: Block, height: f64) {
        let top = self.cursor + self.gap();
        debug!(
            "placing {} on page {} at {:.1}mm ({:.1}mm tall)",
            block.kind(),
            self.page,
            top,
            height
        );
        self.blocks
            .push(PlacedBlock::new(self.page, top, height, block));

        let bottom = top + height;
        if bottom > self.page_height {
            // The renderer continues an oversized block on the following pages.
            let overflow = bottom - self.page_height;
            let spilled = (overflow / self.page_height).ceil().max(1.0);
            self.page += spilled as usize;
            self.cursor = overflow - (spilled - 1.0) * self.page_height;
        } else {
            self.cursor = bottom;
        }
    }

    fn place_table(&mut self, table: DataTable) {
        let height = table_height(&table);
        let lead = table_lead_height(&table);
        // Long tables may start low on a page and flow on; short ones move whole.
        let required = if height > self.page_height { lead } else { height };
        self.place_keeping(Block::Table(table), height, required);
    }

    fn place_section(&mut self, section: ReportSection) {
        let lead = section
            .tables
            .first()
            .map(table_lead_height)
            .unwrap_or(0.0);
        self.place_keeping(
            Block::section_title(section.identifier, section.title),
            SECTION_TITLE_MM,
            SECTION_TITLE_MM + BLOCK_GAP_MM + lead,
        );
        for table in section.tables {
            self.place_table(table);
        }
    }

    /// Appends the signature and footer, moving them to a fresh page when too little room is
    /// left, and returns the finished block list with the page count.
    fn finish(
        mut self,
        signature: SignatureBlock,
        signature_margin: f64,
        generated_on: String,
    ) -> (Vec<PlacedBlock>, usize) {
        if !self.at_page_top() && self.remaining() < signature_margin {
            self.break_page();
        }
        let height = signature_height(&signature);
        self.push(Block::Signature(signature), height);

        let page_count = self.page;
        let footer = Footer::new(generated_on, page_count);
        let top = self.cursor.min(self.page_height);
        self.blocks.push(PlacedBlock::new(
            self.page,
            top,
            FOOTER_MM,
            Block::Footer(footer),
        ));
        (self.blocks, page_count)
    }
}

/// A titled report section with its tables, before placement.
struct ReportSection {
    identifier: &'static str,
    title: &'static str,
    tables: Vec<DataTable>,
}

impl ReportSection {
    fn new(identifier: &'static str, title: &'static str, tables: Vec<DataTable>) -> Self {
        Self {
            identifier,
            title,
            tables,
        }
    }

    fn is_empty(&self) -> bool {
        self.tables.iter().all(DataTable::is_empty)
    }
}

/// The batch (and optionally section and dates) picked in the dashboard for a leave export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSelection {
    batch: String,
    section: Option<String>,
    range: Option<DateRange>,
}

impl BatchSelection {
    pub fn new(batch: impl Into<String>) -> Self {
        Self {
            batch: batch.into(),
            section: None,
            range: None,
        }
    }

    pub fn batch(&self) -> &str {
        &self.batch
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn range(&self) -> Option<&DateRange> {
        self.range.as_ref()
    }

    pub fn with_section(mut self, section: impl Into<Option<String>>) -> Self {
        self.section = section.into();
        self
    }

    pub fn with_range(mut self, range: impl Into<Option<DateRange>>) -> Self {
        self.range = range.into();
        self
    }

    fn matches(&self, request: &Request) -> bool {
        request.batch_label() == self.batch
            && self
                .section
                .as_deref()
                .map_or(true, |section| request.section_label() == section)
            && self
                .range
                .as_ref()
                .map_or(true, |range| request.range().overlaps(range))
    }
}

/// Builds report plans from snapshots.
#[derive(Clone, Debug)]
pub struct Planner<'c> {
    config: &'c ReportConfig,
}

impl<'c> Planner<'c> {
    pub fn new(config: &'c ReportConfig) -> Self {
        Self { config }
    }

    /// Suggested file name of the daily report for `day`.
    pub fn daily_filename(&self, day: NaiveDate) -> String {
        format!(
            "{}_Daily_Report_{}.pdf",
            self.config.file_stem(),
            dates::iso_day(day)
        )
    }

    /// Suggested file name of a batch leave export, dated with the generation day.
    pub fn batch_leave_filename(&self) -> String {
        format!(
            "{}_Leave_Requests_{}.pdf",
            self.config.file_stem(),
            self.config.generated_at().date().format("%d-%m-%Y")
        )
    }

    fn header(&self, title: impl Into<String>, subtitle: String) -> DocumentHeader {
        DocumentHeader::new(
            format!("Department of {}", self.config.department_name()),
            title,
        )
        .with_institution(self.config.institution_name().map(str::to_string))
        .with_subtitle(Some(subtitle))
        .with_logo_path(self.config.logo_path().map(str::to_string))
    }

    fn columns(&self, spec: &[(&str, f64)]) -> Vec<Column> {
        scaled_columns(spec, self.config.content_width_mm())
    }

    fn request_table(
        &self,
        spec: &[(&str, f64)],
        title: String,
        requests: &[&Request],
    ) -> DataTable {
        let mut table = DataTable::new(self.columns(spec)).with_title(Some(title));
        for (index, request) in requests.iter().enumerate() {
            table.push_row(vec![
                Cell::new((index + 1).to_string()),
                Cell::new(request.student_name.as_str()),
                Cell::new(request.roll_no.as_str()),
                Cell::new(dates::display_day(request.from_date)),
                Cell::new(dates::display_day(request.to_date)),
                Cell::new(reason_text(request)),
                staff_cell(
                    request.mentor.as_ref(),
                    request.approvals.stage(Stage::Mentor),
                ),
                staff_cell(
                    request.class_incharge.as_ref(),
                    request.approvals.stage(Stage::ClassIncharge),
                ),
                status_cell(request.status),
            ]);
        }
        table
    }

    fn group_tables(&self, spec: &[(&str, f64)], groups: Vec<RequestGroup<'_>>) -> Vec<DataTable> {
        groups
            .into_iter()
            .filter(|group| !group.requests.is_empty())
            .map(|group| {
                let title = format!(
                    "Batch: {} | Section: {}",
                    group.key.batch, group.key.section
                );
                self.request_table(spec, title, &group.requests)
            })
            .collect()
    }

    fn defaulter_table(&self, defaulters: &[&Defaulter]) -> Vec<DataTable> {
        if defaulters.is_empty() {
            return Vec::new();
        }
        let mut table = DataTable::new(self.columns(DEFAULTER_COLUMNS));
        for (index, defaulter) in defaulters.iter().enumerate() {
            table.push_row(vec![
                Cell::new((index + 1).to_string()),
                Cell::new(defaulter.student_name.as_str()),
                Cell::new(defaulter.roll_no.as_str()),
                Cell::new(defaulter.batch_label()),
                Cell::new(defaulter.section_label()),
                Cell::new(defaulter.defaulter_type.as_str()),
                Cell::new(defaulter.remarks.as_str()),
            ]);
        }
        vec![table]
    }

    fn pending_tables<'a, I>(&self, requests: I) -> Vec<DataTable>
    where
        I: IntoIterator<Item = &'a Request>,
    {
        grouping::partition_by_status(requests)
            .into_iter()
            .filter(|batch| !batch.pending.is_empty())
            .map(|batch| {
                let mut table = DataTable::new(self.columns(PENDING_COLUMNS))
                    .with_title(Some(format!("Batch: {}", batch.batch)));
                for (index, request) in batch.pending.iter().enumerate() {
                    table.push_row(vec![
                        Cell::new((index + 1).to_string()),
                        Cell::new(request.kind.label()),
                        Cell::new(request.student_name.as_str()),
                        Cell::new(request.roll_no.as_str()),
                        Cell::new(request.section_label()),
                        Cell::new(dates::display_day(request.from_date)),
                        Cell::new(dates::display_day(request.to_date)),
                        staff_cell(
                            request.mentor.as_ref(),
                            request.approvals.stage(Stage::Mentor),
                        ),
                        staff_cell(
                            request.class_incharge.as_ref(),
                            request.approvals.stage(Stage::ClassIncharge),
                        ),
                    ]);
                }
                table
            })
            .collect()
    }

    fn signature(&self) -> SignatureBlock {
        SignatureBlock::new(self.config.signatories().iter().cloned())
    }

    fn assemble(
        &self,
        filename: String,
        header: DocumentHeader,
        sections: Vec<ReportSection>,
    ) -> ReportPlan {
        let mut layout = Layout::new(self.config.page_height_mm());
        let height = header_height(&header);
        layout.place(Block::Header(header), height);

        let sections: Vec<ReportSection> = sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect();

        if sections.is_empty() {
            layout.place(Block::placeholder(NO_REQUESTS_FOUND), PLACEHOLDER_MM);
        } else {
            for section in sections {
                debug!(
                    "section `{}` with {} table(s)",
                    section.title,
                    section.tables.len()
                );
                layout.place_section(section);
            }
        }

        let (blocks, page_count) = layout.finish(
            self.signature(),
            self.config.signature_margin_mm(),
            self.config.generated_on_label(),
        );
        info!(
            "planned {} with {} block(s) over {} page(s)",
            filename,
            blocks.len(),
            page_count
        );
        ReportPlan::new(filename, blocks, page_count)
    }

    /// Plans the daily report: leave, OD, defaulters and pending requests for `day`.
    pub fn plan_daily_report(&self, snapshot: &Snapshot, day: NaiveDate) -> ReportPlan {
        let leave = dates::active_on(&snapshot.leave_requests, day);
        let od = dates::active_on(&snapshot.od_requests, day);
        let defaulters = grouping::sort_defaulters(&snapshot.defaulters);
        debug!(
            "daily report for {}: {} leave, {} OD, {} open defaulters",
            day,
            leave.len(),
            od.len(),
            defaulters.len()
        );

        let sections = vec![
            ReportSection::new(
                "leave-requests",
                "Leave Requests",
                self.group_tables(
                    LEAVE_COLUMNS,
                    grouping::group_by_section(leave.iter().copied()),
                ),
            ),
            ReportSection::new(
                "od-requests",
                "OD Requests",
                self.group_tables(OD_COLUMNS, grouping::group_by_section(od.iter().copied())),
            ),
            ReportSection::new("defaulters", "Defaulters", self.defaulter_table(&defaulters)),
            ReportSection::new(
                "pending-requests",
                "Pending Requests",
                self.pending_tables(leave.iter().chain(od.iter()).copied()),
            ),
        ];

        let header = self.header(
            "Daily Leave & OD Report",
            format!("Date: {}", dates::display_day(day)),
        );
        self.assemble(self.daily_filename(day), header, sections)
    }

    /// Plans the leave export for one batch, one table per section.
    pub fn plan_batch_leave_report(
        &self,
        snapshot: &Snapshot,
        selection: &BatchSelection,
    ) -> ReportPlan {
        let requests = snapshot
            .leave_requests
            .iter()
            .filter(|request| selection.matches(request));
        let tables: Vec<DataTable> = grouping::group_by_section(requests)
            .into_iter()
            .filter(|group| !group.requests.is_empty())
            .map(|group| {
                let title = format!("Section: {}", group.key.section);
                self.request_table(LEAVE_COLUMNS, title, &group.requests)
            })
            .collect();

        let mut subtitle = format!("Batch: {}", selection.batch());
        if let Some(section) = selection.section() {
            subtitle.push_str(&format!(" | Section: {}", section));
        }
        if let Some(range) = selection.range() {
            subtitle.push_str(&format!(
                " | {} to {}",
                dates::display_day(range.from()),
                dates::display_day(range.to())
            ));
        }

        let header = self.header("Leave Requests Report", subtitle);
        let sections = vec![ReportSection::new(
            "leave-requests",
            "Leave Requests",
            tables,
        )];
        self.assemble(self.batch_leave_filename(), header, sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RequestKind;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn config() -> ReportConfig {
        ReportConfig::new("CSE").with_generated_at(day(1).and_hms_opt(9, 30, 0).unwrap())
    }

    fn kinds(plan: &ReportPlan) -> Vec<&'static str> {
        plan.iter_blocks().map(Block::kind).collect()
    }

    fn section_titles(plan: &ReportPlan) -> Vec<String> {
        plan.sections()
            .map(|(title, _)| title.title().to_string())
            .collect()
    }

    fn table_titles(plan: &ReportPlan) -> Vec<String> {
        plan.tables()
            .filter_map(|table| table.title().map(str::to_string))
            .collect()
    }

    fn scenario() -> Snapshot {
        Snapshot::new(
            vec![
                Request::new(RequestKind::Leave, "Asha", "23CS001", day(1))
                    .with_to_date(day(2))
                    .with_group("2023-2027", "A")
                    .with_status(Status::Approved),
                Request::new(RequestKind::Leave, "Bala", "22CS014", day(1))
                    .with_group("2022-2026", "B")
                    .with_status(Status::Pending),
            ],
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn staff_cells_follow_stage_status() {
        let staff = Staff::new("A");
        assert_eq!(staff_cell_text(None, None), NOT_ASSIGNED);
        assert_eq!(
            staff_cell_text(Some(&staff), Some(&Approval::new(Status::Pending))),
            "A (pending)"
        );
        assert_eq!(staff_cell_text(Some(&staff), None), "A (pending)");
        assert_eq!(
            staff_cell_text(Some(&staff), Some(&Approval::new(Status::Approved))),
            "A"
        );
        assert_eq!(
            staff_cell_text(Some(&staff), Some(&Approval::new(Status::Rejected))),
            "A"
        );
    }

    #[test]
    fn scenario_orders_groups_and_lists_pending() {
        let config = config();
        let plan = Planner::new(&config).plan_daily_report(&scenario(), day(1));

        assert_eq!(section_titles(&plan), vec!["Leave Requests", "Pending Requests"]);
        assert_eq!(
            table_titles(&plan),
            vec![
                "Batch: 2023-2027 | Section: A",
                "Batch: 2022-2026 | Section: B",
                "Batch: 2022-2026",
            ]
        );

        let pending = plan.tables().last().unwrap();
        assert_eq!(pending.rows().len(), 1);
        assert_eq!(pending.rows()[0][2].text(), "Bala");
        assert_eq!(plan.filename(), "CSE_Daily_Report_2024-03-01.pdf");
    }

    #[test]
    fn empty_day_yields_placeholder_then_signature_and_footer() {
        let config = config();
        let plan = Planner::new(&config).plan_daily_report(&scenario(), day(20));

        assert_eq!(
            kinds(&plan),
            vec!["header", "placeholder", "signature", "footer"]
        );
        assert!(plan
            .iter_blocks()
            .any(|block| *block == Block::placeholder(NO_REQUESTS_FOUND)));
    }

    #[test]
    fn resolved_defaulters_never_appear() {
        let config = config();
        let snapshot = Snapshot::new(
            Vec::new(),
            Vec::new(),
            vec![Defaulter::new("Chitra", "21CS030")
                .with_group("2021-2025", "A")
                .resolved(true)],
        );
        let plan = Planner::new(&config).plan_daily_report(&snapshot, day(1));
        assert!(plan.sections().next().is_none());
        assert_eq!(plan.tables().count(), 0);
    }

    #[test]
    fn planning_is_idempotent() {
        let config = config();
        let planner = Planner::new(&config);
        let snapshot = scenario();
        assert_eq!(
            planner.plan_daily_report(&snapshot, day(1)),
            planner.plan_daily_report(&snapshot, day(1))
        );
    }

    #[test]
    fn sections_keep_fixed_order() {
        let config = config();
        let snapshot = Snapshot::new(
            vec![Request::new(RequestKind::Leave, "Asha", "1", day(1))
                .with_group("2023-2027", "A")
                .with_status(Status::Approved)],
            vec![Request::new(RequestKind::OnDuty, "Dev", "2", day(1))
                .with_group("2023-2027", "A")
                .with_reason("Hackathon")],
            vec![Defaulter::new("Esha", "3").with_group("2023-2027", "B")],
        );
        let plan = Planner::new(&config).plan_daily_report(&snapshot, day(1));
        assert_eq!(
            section_titles(&plan),
            vec!["Leave Requests", "OD Requests", "Defaulters", "Pending Requests"]
        );
        let last_two: Vec<_> = kinds(&plan).into_iter().rev().take(2).collect();
        assert_eq!(last_two, vec!["footer", "signature"]);
    }

    #[test]
    fn long_reports_break_pages_and_count_them() {
        let config = config().with_page_height_mm(120.0);
        let leave: Vec<Request> = (0..40)
            .map(|index| {
                Request::new(RequestKind::Leave, format!("Student {index}"), "R", day(1))
                    .with_group("2023-2027", if index % 2 == 0 { "A" } else { "B" })
            })
            .collect();
        let snapshot = Snapshot::new(leave, Vec::new(), Vec::new());
        let plan = Planner::new(&config).plan_daily_report(&snapshot, day(1));

        assert!(plan.page_count() > 1);
        assert!(plan.iter_blocks().any(|block| *block == Block::PageBreak));
        let pages: Vec<usize> = plan.blocks().iter().map(PlacedBlock::page).collect();
        assert_eq!(pages.first(), Some(&1));
        assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(plan.footer().unwrap().page_count(), plan.page_count());
        assert_eq!(*pages.last().unwrap(), plan.page_count());
    }

    #[test]
    fn signature_moves_to_a_new_page_when_space_runs_out() {
        let config = config().with_page_height_mm(80.0).with_signature_margin_mm(60.0);
        let plan = Planner::new(&config).plan_daily_report(&scenario(), day(20));

        assert_eq!(
            kinds(&plan),
            vec!["header", "placeholder", "page-break", "signature", "footer"]
        );
        assert_eq!(plan.page_count(), 2);
    }

    #[test]
    fn batch_export_filters_batch_section_and_range() {
        let config = config();
        let snapshot = Snapshot::new(
            vec![
                Request::new(RequestKind::Leave, "Asha", "1", day(1)).with_group("2023-2027", "B"),
                Request::new(RequestKind::Leave, "Bala", "2", day(2)).with_group("2023-2027", "A"),
                Request::new(RequestKind::Leave, "Chitra", "3", day(25))
                    .with_group("2023-2027", "A"),
                Request::new(RequestKind::Leave, "Dev", "4", day(1)).with_group("2022-2026", "A"),
            ],
            Vec::new(),
            Vec::new(),
        );
        let selection = BatchSelection::new("2023-2027")
            .with_range(DateRange::new(day(1), Some(day(10))));
        let plan = Planner::new(&config).plan_batch_leave_report(&snapshot, &selection);

        assert_eq!(table_titles(&plan), vec!["Section: A", "Section: B"]);
        assert_eq!(plan.filename(), "CSE_Leave_Requests_01-03-2024.pdf");

        let only_a = Planner::new(&config).plan_batch_leave_report(
            &snapshot,
            &selection.clone().with_section(Some("A".to_string())),
        );
        assert_eq!(only_a.tables().count(), 1);
        assert_eq!(only_a.tables().next().unwrap().rows().len(), 1);
    }

    #[test]
    fn margins_wider_than_the_page_still_paginate() {
        let config = config().with_margin_mm(142.5);
        let leave: Vec<Request> = (0..10)
            .map(|index| {
                Request::new(RequestKind::Leave, format!("Student {index}"), "R", day(1))
                    .with_group("2023-2027", "A")
            })
            .collect();
        let snapshot = Snapshot::new(leave, Vec::new(), Vec::new());
        let plan = Planner::new(&config).plan_daily_report(&snapshot, day(1));

        assert!(plan.page_count() > 1);
        assert_eq!(plan.footer().unwrap().page_count(), plan.page_count());
    }

    #[test]
    fn column_widths_fill_the_content_width() {
        let config = config();
        let plan = Planner::new(&config).plan_daily_report(&scenario(), day(1));
        for table in plan.tables() {
            let total: f64 = table.columns().iter().map(Column::width_mm).sum();
            assert!((total - config.content_width_mm()).abs() < 1e-6);
        }
    }
}
