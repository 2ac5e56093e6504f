//! Raw JSON shapes returned by the dashboard backend.
//!
//! Everything here is optional and loosely typed on purpose: the backend may or may not populate
//! references (`sectionId` can be a bare id or an object carrying the section and its batch), and
//! older records lack newer fields. [`super`] turns these into validated domain values.

use serde::{Deserialize, Serialize};

/// A leave or OD request as stored by the backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "rollNumber")]
    pub roll_no: Option<String>,
    pub section_id: Option<SectionRef>,
    pub mentor_id: Option<StaffRef>,
    pub class_incharge_id: Option<StaffRef>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub reason: Option<String>,
    pub purpose: Option<String>,
    #[serde(alias = "isMedical")]
    pub for_medical: Option<bool>,
    pub status: Option<String>,
    pub approvals: Option<ApprovalsRecord>,
}

/// Reference to a section, either unpopulated or with its batch expanded.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SectionRef {
    Id(String),
    Populated(PopulatedSection),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulatedSection {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub section_name: Option<String>,
    #[serde(rename = "Batch", alias = "batch")]
    pub batch: Option<BatchRef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BatchRef {
    Id(String),
    Populated(PopulatedBatch),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulatedBatch {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub batch_name: Option<String>,
}

/// Reference to a staff member (mentor or class incharge).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StaffRef {
    Id(String),
    Populated(PopulatedStaff),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulatedStaff {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApprovalsRecord {
    pub mentor: Option<ApprovalRecord>,
    pub class_incharge: Option<ApprovalRecord>,
    pub hod: Option<ApprovalRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApprovalRecord {
    pub status: Option<String>,
    pub comment: Option<String>,
}

/// A flagged student.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaulterRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "rollNumber")]
    pub roll_no: Option<String>,
    pub batch_name: Option<String>,
    pub section_name: Option<String>,
    pub section_id: Option<SectionRef>,
    pub defaulter_type: Option<String>,
    pub remarks: Option<String>,
    pub is_done: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(alias = "batchName", alias = "name")]
    pub batch_name: Option<String>,
    pub sections: Vec<SectionRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(alias = "sectionName", alias = "name")]
    pub section_name: Option<String>,
}

/// Top-level snapshot document. Items stay as raw JSON so one malformed record cannot fail the
/// whole document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub leave_requests: Vec<serde_json::Value>,
    pub od_requests: Vec<serde_json::Value>,
    pub defaulters: Vec<serde_json::Value>,
    pub batches: Vec<serde_json::Value>,
}

impl SectionRef {
    pub(crate) fn section_name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(section) => section.section_name.as_deref(),
        }
    }

    pub(crate) fn batch_name(&self) -> Option<&str> {
        match self {
            Self::Populated(PopulatedSection {
                batch: Some(BatchRef::Populated(batch)),
                ..
            }) => batch.batch_name.as_deref(),
            _ => None,
        }
    }
}

impl StaffRef {
    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated(staff) => staff.name.as_deref(),
        }
    }
}
