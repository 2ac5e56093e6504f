//! Validated request, defaulter and batch records.
//!
//! The backend hands out loosely shaped JSON (see [`wire`]). Records are checked once here and
//! reach the rest of the crate with explicit optional fields and concrete dates. A record with an
//! unusable date is dropped with a warning instead of failing the whole snapshot.

pub mod wire;

use std::fmt;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::dates::{self, DateRange};
use crate::error::ReportError;
use wire::{
    ApprovalRecord, ApprovalsRecord, BatchRecord, DefaulterRecord, RequestRecord, SnapshotRecord,
};

/// Label used when a record carries no batch name.
pub const UNKNOWN_BATCH: &str = "Unknown Batch";
/// Label used when a record carries no section name.
pub const UNKNOWN_SECTION: &str = "Unknown Section";

/// Which kind of absence a request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RequestKind {
    /// Regular student leave.
    Leave,
    /// On-duty absence for official activities.
    OnDuty,
}

impl RequestKind {
    /// Short label printed in report tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::Leave => "Leave",
            Self::OnDuty => "OD",
        }
    }
}

/// State of a request or of a single approval stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any value the backend sends that is none of the above.
    Unknown,
}

impl Status {
    /// Parses a backend status string, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Unknown,
        }
    }

    /// The lowercase wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }

    /// Capitalized label for report cells.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded by one approval stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Approval {
    pub status: Status,
    pub comment: Option<String>,
}

impl Approval {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<Option<String>>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// The three people who sign off on a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Mentor,
    ClassIncharge,
    Hod,
}

/// Per-stage approvals of a request. A missing stage has not acted yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApprovalStages {
    pub mentor: Option<Approval>,
    pub class_incharge: Option<Approval>,
    pub hod: Option<Approval>,
}

impl ApprovalStages {
    pub fn stage(&self, stage: Stage) -> Option<&Approval> {
        match stage {
            Stage::Mentor => self.mentor.as_ref(),
            Stage::ClassIncharge => self.class_incharge.as_ref(),
            Stage::Hod => self.hod.as_ref(),
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut Option<Approval> {
        match stage {
            Stage::Mentor => &mut self.mentor,
            Stage::ClassIncharge => &mut self.class_incharge,
            Stage::Hod => &mut self.hod,
        }
    }

    /// Status of `stage`, treating a missing stage as pending.
    pub fn status_of(&self, stage: Stage) -> Status {
        self.stage(stage)
            .map(|approval| approval.status)
            .unwrap_or(Status::Pending)
    }

    /// Overall status implied by the stages: any rejection rejects the request, three approvals
    /// approve it, anything else is still pending.
    pub fn derived_status(&self) -> Status {
        let statuses = [
            self.status_of(Stage::Mentor),
            self.status_of(Stage::ClassIncharge),
            self.status_of(Stage::Hod),
        ];

        if statuses.contains(&Status::Rejected) {
            Status::Rejected
        } else if statuses.iter().all(|status| *status == Status::Approved) {
            Status::Approved
        } else {
            Status::Pending
        }
    }
}

/// A staff member referenced by a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Staff {
    pub name: String,
}

impl Staff {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A student's leave or OD request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub id: Option<String>,
    pub kind: RequestKind,
    pub student_name: String,
    pub roll_no: String,
    pub batch_name: Option<String>,
    pub section_name: Option<String>,
    pub mentor: Option<Staff>,
    pub class_incharge: Option<Staff>,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
    /// Only meaningful for leave; always `false` for OD.
    pub medical: bool,
    pub status: Status,
    pub approvals: ApprovalStages,
}

impl Request {
    /// Creates a single-day pending request without batch, section or staff.
    pub fn new(
        kind: RequestKind,
        student_name: impl Into<String>,
        roll_no: impl Into<String>,
        from_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            kind,
            student_name: student_name.into(),
            roll_no: roll_no.into(),
            batch_name: None,
            section_name: None,
            mentor: None,
            class_incharge: None,
            from_date,
            to_date: from_date,
            reason: String::new(),
            medical: false,
            status: Status::Pending,
            approvals: ApprovalStages::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_group(mut self, batch: impl Into<String>, section: impl Into<String>) -> Self {
        self.batch_name = Some(batch.into());
        self.section_name = Some(section.into());
        self
    }

    /// Sets the last day of the request. Earlier days than `from_date` are ignored.
    pub fn with_to_date(mut self, to_date: NaiveDate) -> Self {
        if to_date >= self.from_date {
            self.to_date = to_date;
        }
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_medical(mut self, medical: bool) -> Self {
        self.medical = medical && self.kind == RequestKind::Leave;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_mentor(mut self, name: impl Into<String>, approval: Option<Approval>) -> Self {
        self.mentor = Some(Staff::new(name));
        self.approvals.mentor = approval;
        self
    }

    pub fn with_class_incharge(
        mut self,
        name: impl Into<String>,
        approval: Option<Approval>,
    ) -> Self {
        self.class_incharge = Some(Staff::new(name));
        self.approvals.class_incharge = approval;
        self
    }

    pub fn with_hod_approval(mut self, approval: Option<Approval>) -> Self {
        self.approvals.hod = approval;
        self
    }

    /// Batch name or [`UNKNOWN_BATCH`].
    pub fn batch_label(&self) -> &str {
        self.batch_name.as_deref().unwrap_or(UNKNOWN_BATCH)
    }

    /// Section name or [`UNKNOWN_SECTION`].
    pub fn section_label(&self) -> &str {
        self.section_name.as_deref().unwrap_or(UNKNOWN_SECTION)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.from_date, Some(self.to_date))
            .unwrap_or_else(|| DateRange::single(self.from_date))
    }

    /// Short human readable identity used in log lines.
    fn describe(&self) -> String {
        format!("{} {} ({})", self.kind.label(), self.student_name, self.roll_no)
    }
}

/// A student flagged for an infraction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Defaulter {
    pub id: Option<String>,
    pub student_name: String,
    pub roll_no: String,
    pub batch_name: Option<String>,
    pub section_name: Option<String>,
    pub defaulter_type: String,
    pub remarks: String,
    /// Resolved defaulters never appear in reports.
    pub is_done: bool,
}

impl Defaulter {
    pub fn new(student_name: impl Into<String>, roll_no: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            roll_no: roll_no.into(),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, batch: impl Into<String>, section: impl Into<String>) -> Self {
        self.batch_name = Some(batch.into());
        self.section_name = Some(section.into());
        self
    }

    pub fn with_type(mut self, defaulter_type: impl Into<String>) -> Self {
        self.defaulter_type = defaulter_type.into();
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn resolved(mut self, is_done: bool) -> Self {
        self.is_done = is_done;
        self
    }

    pub fn batch_label(&self) -> &str {
        self.batch_name.as_deref().unwrap_or(UNKNOWN_BATCH)
    }

    pub fn section_label(&self) -> &str {
        self.section_name.as_deref().unwrap_or(UNKNOWN_SECTION)
    }
}

/// A section within a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    pub id: Option<String>,
    pub name: String,
}

/// A cohort of students and its sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    pub id: Option<String>,
    pub name: String,
    pub sections: Vec<SectionInfo>,
}

impl Batch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn with_section(mut self, name: impl Into<String>) -> Self {
        self.sections.push(SectionInfo {
            id: None,
            name: name.into(),
        });
        self
    }
}

/// Reasons a single record is left out of a snapshot.
#[derive(Debug, Error)]
pub enum RecordIssue {
    #[error("record does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing fromDate")]
    MissingFromDate,
    #[error("unparseable {field} `{value}`")]
    InvalidDate { field: &'static str, value: String },
    #[error("toDate {to} precedes fromDate {from}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

fn parse_date_field(field: &'static str, value: &str) -> Result<NaiveDate, RecordIssue> {
    dates::parse_day(value).ok_or_else(|| RecordIssue::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn approval_from(record: Option<ApprovalRecord>) -> Option<Approval> {
    let record = record?;
    let status = record
        .status
        .as_deref()
        .map(Status::parse)
        .unwrap_or(Status::Pending);
    let comment = record
        .comment
        .map(|comment| comment.trim().to_string())
        .filter(|comment| !comment.is_empty());
    Some(Approval { status, comment })
}

fn stages_from(record: Option<ApprovalsRecord>) -> ApprovalStages {
    let record = record.unwrap_or_default();
    ApprovalStages {
        mentor: approval_from(record.mentor),
        class_incharge: approval_from(record.class_incharge),
        hod: approval_from(record.hod),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Validates one raw request.
pub fn ingest_request(
    kind: RequestKind,
    record: RequestRecord,
) -> Result<Request, RecordIssue> {
    let from_raw = record
        .from_date
        .as_deref()
        .ok_or(RecordIssue::MissingFromDate)?;
    let from_date = parse_date_field("fromDate", from_raw)?;
    let to_date = match non_blank(record.to_date.as_deref()) {
        Some(to_raw) => parse_date_field("toDate", &to_raw)?,
        None => from_date,
    };
    if to_date < from_date {
        return Err(RecordIssue::InvertedRange {
            from: from_date,
            to: to_date,
        });
    }

    let section = record.section_id.as_ref();
    let reason = match kind {
        RequestKind::Leave => record.reason.or(record.purpose),
        RequestKind::OnDuty => record.purpose.or(record.reason),
    };

    Ok(Request {
        id: record.id,
        kind,
        student_name: record.name.unwrap_or_default(),
        roll_no: record.roll_no.unwrap_or_default(),
        batch_name: non_blank(section.and_then(|section| section.batch_name())),
        section_name: non_blank(section.and_then(|section| section.section_name())),
        mentor: non_blank(record.mentor_id.as_ref().and_then(|staff| staff.name()))
            .map(Staff::new),
        class_incharge: non_blank(
            record
                .class_incharge_id
                .as_ref()
                .and_then(|staff| staff.name()),
        )
        .map(Staff::new),
        from_date,
        to_date,
        reason: reason.unwrap_or_default(),
        medical: kind == RequestKind::Leave && record.for_medical.unwrap_or(false),
        status: record
            .status
            .as_deref()
            .map(Status::parse)
            .unwrap_or(Status::Pending),
        approvals: stages_from(record.approvals),
    })
}

/// Validates raw requests, dropping the ones that fail with a warning.
pub fn ingest_requests<I>(kind: RequestKind, values: I) -> Vec<Request>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    let mut accepted = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        let result = serde_json::from_value::<RequestRecord>(value)
            .map_err(RecordIssue::from)
            .and_then(|record| ingest_request(kind, record));
        match result {
            Ok(request) => {
                debug!("accepted {}", request.describe());
                accepted.push(request);
            }
            Err(issue) => warn!("skipping {} record #{}: {}", kind.label(), index, issue),
        }
    }
    accepted
}

/// Converts one raw defaulter. Flat `batchName`/`sectionName` win over a populated `sectionId`.
pub fn ingest_defaulter(record: DefaulterRecord) -> Defaulter {
    let section = record.section_id.as_ref();
    Defaulter {
        id: record.id,
        student_name: record.name.unwrap_or_default(),
        roll_no: record.roll_no.unwrap_or_default(),
        batch_name: non_blank(record.batch_name.as_deref())
            .or_else(|| non_blank(section.and_then(|section| section.batch_name()))),
        section_name: non_blank(record.section_name.as_deref())
            .or_else(|| non_blank(section.and_then(|section| section.section_name()))),
        defaulter_type: record.defaulter_type.unwrap_or_default(),
        remarks: record.remarks.unwrap_or_default(),
        is_done: record.is_done.unwrap_or(false),
    }
}

pub fn ingest_defaulters<I>(values: I) -> Vec<Defaulter>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, value)| match serde_json::from_value::<DefaulterRecord>(value) {
                Ok(record) => Some(ingest_defaulter(record)),
                Err(err) => {
                    warn!("skipping defaulter record #{}: {}", index, err);
                    None
                }
            },
        )
        .collect()
}

pub fn ingest_batch(record: BatchRecord) -> Option<Batch> {
    let name = non_blank(record.batch_name.as_deref())?;
    let sections = record
        .sections
        .into_iter()
        .filter_map(|section| {
            non_blank(section.section_name.as_deref()).map(|name| SectionInfo {
                id: section.id,
                name,
            })
        })
        .collect();
    Some(Batch {
        id: record.id,
        name,
        sections,
    })
}

pub fn ingest_batches<I>(values: I) -> Vec<Batch>
where
    I: IntoIterator<Item = serde_json::Value>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let batch = serde_json::from_value::<BatchRecord>(value)
                .map_err(|err| warn!("skipping batch record #{}: {}", index, err))
                .ok()?;
            let batch = ingest_batch(batch);
            if batch.is_none() {
                warn!("skipping batch record #{}: missing batch name", index);
            }
            batch
        })
        .collect()
}

/// Everything one report needs, read once from the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub leave_requests: Vec<Request>,
    pub od_requests: Vec<Request>,
    pub defaulters: Vec<Defaulter>,
    pub batches: Vec<Batch>,
}

impl Snapshot {
    pub fn new(
        leave_requests: Vec<Request>,
        od_requests: Vec<Request>,
        defaulters: Vec<Defaulter>,
    ) -> Self {
        Self {
            leave_requests,
            od_requests,
            defaulters,
            batches: Vec::new(),
        }
    }

    pub fn with_batches(mut self, batches: Vec<Batch>) -> Self {
        self.batches = batches;
        self
    }

    /// Parses a snapshot document of the form
    /// `{ "leaveRequests": [..], "odRequests": [..], "defaulters": [..], "batches": [..] }`.
    ///
    /// Only a document that is not such an object is an error; bad entries are skipped.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let record: SnapshotRecord = serde_json::from_str(json)?;
        Ok(Self::from_record(record))
    }

    pub fn from_record(record: SnapshotRecord) -> Self {
        let snapshot = Self {
            leave_requests: ingest_requests(RequestKind::Leave, record.leave_requests),
            od_requests: ingest_requests(RequestKind::OnDuty, record.od_requests),
            defaulters: ingest_defaulters(record.defaulters),
            batches: ingest_batches(record.batches),
        };
        debug!(
            "snapshot loaded: {} leave, {} OD, {} defaulters, {} batches",
            snapshot.leave_requests.len(),
            snapshot.od_requests.len(),
            snapshot.defaulters.len(),
            snapshot.batches.len()
        );
        snapshot
    }

    /// Leave requests followed by OD requests.
    pub fn all_requests(&self) -> impl Iterator<Item = &Request> {
        self.leave_requests.iter().chain(self.od_requests.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(value: &str) -> NaiveDate {
        dates::parse_day(value).unwrap()
    }

    #[test]
    fn populated_references_are_flattened() {
        let snapshot = Snapshot::from_json(
            &json!({
                "leaveRequests": [{
                    "_id": "l1",
                    "name": "Asha",
                    "rollNo": "21CS001",
                    "sectionId": {
                        "_id": "s1",
                        "section_name": "A",
                        "Batch": { "_id": "b1", "batch_name": "2023-2027" }
                    },
                    "mentorId": { "_id": "m1", "name": "Dr. Rao" },
                    "classInchargeId": "c1",
                    "fromDate": "2024-03-01T00:00:00.000Z",
                    "reason": "Fever",
                    "forMedical": true,
                    "status": "Pending",
                    "approvals": { "mentor": { "status": "approved", "comment": "  ok " } }
                }]
            })
            .to_string(),
        )
        .unwrap();

        let request = &snapshot.leave_requests[0];
        assert_eq!(request.batch_label(), "2023-2027");
        assert_eq!(request.section_label(), "A");
        assert_eq!(request.mentor, Some(Staff::new("Dr. Rao")));
        assert_eq!(request.class_incharge, None);
        assert_eq!(request.from_date, day("2024-03-01"));
        assert_eq!(request.to_date, day("2024-03-01"));
        assert!(request.medical);
        assert_eq!(request.status, Status::Pending);
        assert_eq!(
            request.approvals.mentor,
            Some(Approval::new(Status::Approved).with_comment(Some("ok".to_string())))
        );
        assert_eq!(request.approvals.hod, None);
    }

    #[test]
    fn missing_names_fall_back_to_sentinels() {
        let request = ingest_request(
            RequestKind::OnDuty,
            RequestRecord {
                section_id: Some(wire::SectionRef::Id("s1".into())),
                from_date: Some("2024-03-01".into()),
                purpose: Some("Symposium".into()),
                for_medical: Some(true),
                ..RequestRecord::default()
            },
        )
        .unwrap();

        assert_eq!(request.batch_label(), UNKNOWN_BATCH);
        assert_eq!(request.section_label(), UNKNOWN_SECTION);
        assert_eq!(request.reason, "Symposium");
        assert!(!request.medical);
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let requests = ingest_requests(
            RequestKind::Leave,
            vec![
                json!({ "name": "no date" }),
                json!({ "name": "bad date", "fromDate": "someday" }),
                json!({ "name": "inverted", "fromDate": "2024-03-05", "toDate": "2024-03-01" }),
                json!({ "name": "wrong type", "fromDate": 20240301 }),
                json!({ "name": "fine", "fromDate": "2024-03-01", "toDate": "" }),
            ],
        );

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].student_name, "fine");
    }

    #[test]
    fn snapshot_rejects_non_object_documents() {
        assert!(matches!(
            Snapshot::from_json("[1, 2, 3]"),
            Err(ReportError::Snapshot(_))
        ));
        assert_eq!(Snapshot::from_json("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn defaulters_read_flat_or_nested_groups() {
        let defaulters = ingest_defaulters(vec![
            json!({ "name": "Asha", "batchName": "2022-2026", "sectionName": "B", "isDone": true }),
            json!({
                "name": "Bala",
                "sectionId": { "section_name": "C", "Batch": { "batch_name": "2024-2028" } }
            }),
        ]);

        assert!(defaulters[0].is_done);
        assert_eq!(defaulters[0].section_label(), "B");
        assert!(!defaulters[1].is_done);
        assert_eq!(defaulters[1].batch_label(), "2024-2028");
        assert_eq!(defaulters[1].section_label(), "C");
    }

    #[test]
    fn derived_status_follows_stages() {
        let mut stages = ApprovalStages::default();
        assert_eq!(stages.derived_status(), Status::Pending);

        stages.mentor = Some(Approval::new(Status::Approved));
        stages.class_incharge = Some(Approval::new(Status::Approved));
        stages.hod = Some(Approval::new(Status::Approved));
        assert_eq!(stages.derived_status(), Status::Approved);

        stages.class_incharge = Some(Approval::new(Status::Rejected));
        assert_eq!(stages.derived_status(), Status::Rejected);
    }

    #[test]
    fn status_parsing_is_lenient() {
        assert_eq!(Status::parse(" APPROVED "), Status::Approved);
        assert_eq!(Status::parse("rejected"), Status::Rejected);
        assert_eq!(Status::parse("withdrawn"), Status::Unknown);
    }
}
