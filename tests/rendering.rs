use chrono::NaiveDate;
use hod_reports::records::{Request, RequestKind, Status};
use hod_reports::{fonts, DocumentEmitter, PdfEmitter, Planner, ReportConfig, ReportPlan, Snapshot};
use sha2::{Digest, Sha256};

const SNAPSHOT: &str = include_str!("../demos/snapshot.json");

fn daily_plan(config: &ReportConfig) -> ReportPlan {
    let snapshot = Snapshot::from_json(SNAPSHOT).expect("demo snapshot parses");
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid day");
    Planner::new(config).plan_daily_report(&snapshot, day)
}

fn fixed_config() -> ReportConfig {
    let generated = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(18, 0, 0))
        .expect("valid timestamp");
    ReportConfig::new("CSE").with_generated_at(generated)
}

/// A day with enough approved leave in one class for the table to run over several pages.
fn crowded_plan(config: &ReportConfig) -> ReportPlan {
    let day = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid day");
    let leave = (0..150)
        .map(|index| {
            let roll_no = format!("23CS{index:03}");
            Request::new(RequestKind::Leave, format!("Student {index}"), roll_no, day)
                .with_group("2023-2027", "A")
                .with_status(Status::Approved)
        })
        .collect();
    let snapshot = Snapshot::new(leave, Vec::new(), Vec::new());
    Planner::new(config).plan_daily_report(&snapshot, day)
}

fn render_daily_pdf() -> Option<Vec<u8>> {
    if !fonts::default_fonts_available() {
        return None;
    }
    let config = fixed_config();
    let bytes = PdfEmitter::new(&config)
        .emit(&daily_plan(&config))
        .expect("render daily report");
    Some(bytes)
}

const VOLATILE_SEGMENTS: &[(&[u8], &[u8])] = &[
    (b"/CreationDate(", b")"),
    (b"/ModDate(", b")"),
    (b"/ID[", b"]"),
    (b"/Producer(", b")"),
    (b"<xmp:CreateDate>", b"</xmp:CreateDate>"),
    (b"<xmp:ModifyDate>", b"</xmp:ModifyDate>"),
    (b"<xmp:MetadataDate>", b"</xmp:MetadataDate>"),
    (b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>"),
    (b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>"),
    (b"<xmpMM:VersionID>", b"</xmpMM:VersionID>"),
];

/// Blanks out timestamps and identifiers that change between otherwise identical renders.
fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn blank_between(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while let Some(found) = find(&data[offset..], start) {
            let from = offset + found + start.len();
            let Some(length) = find(&data[from..], end) else {
                break;
            };
            for byte in &mut data[from..from + length] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = from + length + end.len();
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    let mut normalized = bytes.to_vec();
    for (start, end) in VOLATILE_SEGMENTS {
        blank_between(&mut normalized, start, end);
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn renders_a_pdf_document() {
    let Some(bytes) = render_daily_pdf() else {
        eprintln!(
            "Skipping renders_a_pdf_document: no fonts found. Set HOD_REPORTS_FONTS_DIR or install Liberation Sans."
        );
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "output should be a PDF file");
}

#[test]
fn rendering_is_deterministic() {
    let (Some(bytes_a), Some(bytes_b)) = (render_daily_pdf(), render_daily_pdf()) else {
        eprintln!(
            "Skipping rendering_is_deterministic: no fonts found. Set HOD_REPORTS_FONTS_DIR or install Liberation Sans."
        );
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn scrubbing_ignores_creation_dates() {
    let a = b"%PDF /CreationDate(D:20240301) body";
    let b = b"%PDF /CreationDate(D:20991231) body";
    assert_eq!(normalized_hash(a), normalized_hash(b));
    let changed = b"%PDF /CreationDate(D:20240301) other";
    assert_ne!(normalized_hash(a), normalized_hash(changed));
}

#[test]
fn page_totals_match_the_rendered_document() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping page_totals_match_the_rendered_document: no fonts found.");
        return;
    }
    let config = fixed_config();
    let rendered = PdfEmitter::new(&config)
        .render(&crowded_plan(&config))
        .expect("render crowded report");

    let document = lopdf::Document::load_mem(&rendered.bytes).expect("reload rendered PDF");
    let pages = document.get_pages().len();
    assert!(pages > 1, "150 rows should not fit on one page");
    assert_eq!(rendered.page_count, pages);

    let expected: Vec<String> = (1..=pages)
        .map(|page| format!("Page {} of {}", page, pages))
        .collect();
    assert_eq!(rendered.page_labels, expected);

    assert_eq!(rendered.sections.len(), 1);
    assert_eq!(rendered.sections[0].section.identifier(), "leave-requests");
    assert_eq!(rendered.sections[0].page, 1);
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_point_at_report_sections() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping bookmarks_point_at_report_sections: no fonts found.");
        return;
    }
    let config = fixed_config();
    let plan = daily_plan(&config);
    let rendered = PdfEmitter::new(&config)
        .render_with_bookmarks(&plan)
        .expect("render with bookmarks");

    let document = lopdf::Document::load_mem(&rendered.bytes).expect("reload bookmarked PDF");
    let catalog = document.catalog().expect("catalog present");
    let outlines = catalog
        .get(b"Outlines")
        .and_then(lopdf::Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
        .expect("catalog should reference the outline");
    assert_eq!(
        outlines.get(b"Count").and_then(lopdf::Object::as_i64).expect("count"),
        rendered.sections.len() as i64
    );

    let pages = document.get_pages();
    let mut item = outlines.get(b"First").and_then(lopdf::Object::as_reference).ok();
    for section in &rendered.sections {
        let id = item.expect("one outline item per section");
        let entry = document.get_dictionary(id).expect("outline item");
        let dest = entry.get(b"Dest").and_then(lopdf::Object::as_array).expect("destination");
        let target = dest[0].as_reference().expect("page reference");
        assert_eq!(Some(&target), pages.get(&(section.page as u32)));
        item = entry.get(b"Next").and_then(lopdf::Object::as_reference).ok();
    }
    assert!(item.is_none());
}
