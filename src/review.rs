//! HOD review helpers: the approval queue, decisions and the batch directory.

use serde::Serialize;

use crate::grouping;
use crate::records::{Approval, Batch, Request, Stage, Status};

/// Requests still waiting for the HOD, in section-grouped report order.
///
/// A request qualifies while its overall status is pending and the HOD stage has not approved or
/// rejected it.
pub fn awaiting_hod<'a, I>(requests: I) -> Vec<&'a Request>
where
    I: IntoIterator<Item = &'a Request>,
{
    let waiting = requests.into_iter().filter(|request| {
        request.status == Status::Pending
            && request.approvals.status_of(Stage::Hod) == Status::Pending
    });
    grouping::group_by_section(waiting)
        .into_iter()
        .flat_map(|group| group.requests)
        .collect()
}

/// What the HOD decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Approve,
    Reject,
}

impl Action {
    pub fn status(self) -> Status {
        match self {
            Self::Approve => Status::Approved,
            Self::Reject => Status::Rejected,
        }
    }
}

/// Request body sent to the backend for an HOD decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecisionPayload {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// An approve/reject decision with an optional comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HodDecision {
    action: Action,
    comment: Option<String>,
}

impl HodDecision {
    /// Creates a decision. Blank comments are dropped and others trimmed.
    pub fn new(action: Action, comment: Option<&str>) -> Self {
        let comment = comment
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_string);
        Self { action, comment }
    }

    pub fn approve() -> Self {
        Self::new(Action::Approve, None)
    }

    pub fn reject(comment: &str) -> Self {
        Self::new(Action::Reject, Some(comment))
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn payload(&self) -> DecisionPayload {
        DecisionPayload {
            status: self.action.status(),
            comment: self.comment.clone(),
        }
    }

    /// JSON body for the backend.
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::to_value(self.payload()).unwrap_or_default()
    }

    /// Returns a copy of `request` with the HOD stage recorded and the overall status re-derived.
    pub fn apply(&self, request: &Request) -> Request {
        let mut updated = request.clone();
        *updated.approvals.stage_mut(Stage::Hod) =
            Some(Approval::new(self.action.status()).with_comment(self.comment.clone()));
        updated.status = match self.action {
            Action::Reject => Status::Rejected,
            // An approval only completes the request once the earlier stages agree.
            Action::Approve => updated.approvals.derived_status(),
        };
        updated
    }
}

/// Batches newest first, each with its sections in alphabetical order.
pub fn batch_directory(batches: &[Batch]) -> Vec<Batch> {
    let mut directory: Vec<Batch> = batches.to_vec();
    directory.sort_by(|a, b| b.name.cmp(&a.name));
    for batch in &mut directory {
        batch.sections.sort_by(|a, b| a.name.cmp(&b.name));
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RequestKind;
    use chrono::NaiveDate;
    use serde_json::json;

    fn request(name: &str) -> Request {
        Request::new(
            RequestKind::Leave,
            name,
            "R",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[test]
    fn queue_skips_decided_requests() {
        let requests = vec![
            request("waiting").with_group("2023-2027", "B"),
            request("done").with_status(Status::Approved),
            request("hod-rejected")
                .with_hod_approval(Some(Approval::new(Status::Rejected))),
            request("first").with_group("2023-2027", "A"),
        ];

        let names: Vec<_> = awaiting_hod(&requests)
            .into_iter()
            .map(|r| r.student_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "waiting"]);
    }

    #[test]
    fn decision_payload_trims_comments() {
        assert_eq!(
            HodDecision::reject("  missing proof ").payload_json(),
            json!({ "status": "rejected", "comment": "missing proof" })
        );
        assert_eq!(
            HodDecision::new(Action::Approve, Some("   ")).payload_json(),
            json!({ "status": "approved" })
        );
    }

    #[test]
    fn approving_completes_only_after_earlier_stages() {
        let base = request("a")
            .with_mentor("M", Some(Approval::new(Status::Approved)))
            .with_class_incharge("C", Some(Approval::new(Status::Approved)));
        let approved = HodDecision::approve().apply(&base);
        assert_eq!(approved.status, Status::Approved);
        assert_eq!(approved.approvals.status_of(Stage::Hod), Status::Approved);

        let early = HodDecision::approve().apply(&request("b"));
        assert_eq!(early.status, Status::Pending);

        let rejected = HodDecision::reject("no").apply(&base);
        assert_eq!(rejected.status, Status::Rejected);
        assert_eq!(
            rejected.approvals.hod.as_ref().and_then(|a| a.comment.as_deref()),
            Some("no")
        );
    }

    #[test]
    fn directory_orders_batches_and_sections() {
        let directory = batch_directory(&[
            Batch::new("2022-2026").with_section("B").with_section("A"),
            Batch::new("2024-2028").with_section("C"),
        ]);
        assert_eq!(directory[0].name, "2024-2028");
        let sections: Vec<_> = directory[1].sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sections, vec!["A", "B"]);
    }
}
