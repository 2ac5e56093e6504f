//! Batch and section grouping with the ordering used across every report.
//!
//! Batches sort newest-first (descending by name, so `2024-2028` comes before `2023-2027`) and
//! sections sort alphabetically inside a batch. All sorts are stable, so records that compare
//! equal keep the order the backend returned them in.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;

use crate::records::{Defaulter, Request, Status};

/// The `(batch, section)` pair a record belongs to, with sentinels already substituted.
///
/// `Ord` follows report order: batch descending, then section ascending.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub batch: String,
    pub section: String,
}

impl GroupKey {
    pub fn new(batch: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            batch: batch.into(),
            section: section.into(),
        }
    }

    pub fn of_request(request: &Request) -> Self {
        Self::new(request.batch_label(), request.section_label())
    }

    pub fn of_defaulter(defaulter: &Defaulter) -> Self {
        Self::new(defaulter.batch_label(), defaulter.section_label())
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .batch
            .cmp(&self.batch)
            .then_with(|| self.section.cmp(&other.section))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Requests sharing one batch and section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestGroup<'a> {
    pub key: GroupKey,
    pub requests: Vec<&'a Request>,
}

/// Stable sort by section name, ascending.
pub fn sort_by_section(requests: &mut [&Request]) {
    requests.sort_by(|a, b| a.section_label().cmp(b.section_label()));
}

/// Partitions requests into batch x section groups in report order.
///
/// Every request lands in exactly one group; equal keys share a group.
pub fn group_by_section<'a, I>(requests: I) -> Vec<RequestGroup<'a>>
where
    I: IntoIterator<Item = &'a Request>,
{
    let mut groups: BTreeMap<GroupKey, Vec<&'a Request>> = BTreeMap::new();
    for request in requests {
        groups
            .entry(GroupKey::of_request(request))
            .or_default()
            .push(request);
    }

    groups
        .into_iter()
        .map(|(key, mut requests)| {
            sort_by_section(&mut requests);
            RequestGroup { key, requests }
        })
        .collect()
}

/// Approved and pending requests of one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchStatusGroup<'a> {
    pub batch: String,
    pub approved: Vec<&'a Request>,
    pub pending: Vec<&'a Request>,
}

impl BatchStatusGroup<'_> {
    pub fn is_empty(&self) -> bool {
        self.approved.is_empty() && self.pending.is_empty()
    }
}

/// Splits requests per batch (descending) into approved and pending lists.
///
/// Rejected and unrecognised statuses are left out of both lists, and a batch with nothing left
/// is dropped.
pub fn partition_by_status<'a, I>(requests: I) -> Vec<BatchStatusGroup<'a>>
where
    I: IntoIterator<Item = &'a Request>,
{
    let mut batches: BTreeMap<Reverse<&'a str>, BatchStatusGroup<'a>> = BTreeMap::new();
    for request in requests {
        let group = batches
            .entry(Reverse(request.batch_label()))
            .or_insert_with(|| BatchStatusGroup {
                batch: request.batch_label().to_string(),
                ..BatchStatusGroup::default()
            });
        match request.status {
            Status::Approved => group.approved.push(request),
            Status::Pending => group.pending.push(request),
            Status::Rejected | Status::Unknown => {}
        }
    }

    batches
        .into_values()
        .filter(|group| !group.is_empty())
        .map(|mut group| {
            sort_by_section(&mut group.approved);
            sort_by_section(&mut group.pending);
            group
        })
        .collect()
}

/// Unresolved defaulters in report order.
pub fn sort_defaulters<'a, I>(defaulters: I) -> Vec<&'a Defaulter>
where
    I: IntoIterator<Item = &'a Defaulter>,
{
    let mut open: Vec<&Defaulter> = defaulters
        .into_iter()
        .filter(|defaulter| !defaulter.is_done)
        .collect();
    open.sort_by(|a, b| GroupKey::of_defaulter(a).cmp(&GroupKey::of_defaulter(b)));
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RequestKind, UNKNOWN_BATCH, UNKNOWN_SECTION};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn leave(name: &str, batch: &str, section: &str) -> Request {
        Request::new(RequestKind::Leave, name, "R", day()).with_group(batch, section)
    }

    fn keys(groups: &[RequestGroup<'_>]) -> Vec<(String, String)> {
        groups
            .iter()
            .map(|group| (group.key.batch.clone(), group.key.section.clone()))
            .collect()
    }

    #[test]
    fn groups_sort_batch_descending_then_section_ascending() {
        let requests = vec![
            leave("a", "2022-2026", "B"),
            leave("b", "2023-2027", "B"),
            leave("c", "2023-2027", "A"),
            leave("d", "2022-2026", "A"),
        ];

        let groups = group_by_section(&requests);
        assert_eq!(
            keys(&groups),
            vec![
                ("2023-2027".to_string(), "A".to_string()),
                ("2023-2027".to_string(), "B".to_string()),
                ("2022-2026".to_string(), "A".to_string()),
                ("2022-2026".to_string(), "B".to_string()),
            ]
        );
    }

    #[test]
    fn grouping_is_a_partition_and_merges_equal_keys() {
        let requests = vec![
            leave("first", "2023-2027", "A"),
            Request::new(RequestKind::Leave, "orphan", "R", day()),
            leave("second", "2023-2027", "A"),
        ];

        let groups = group_by_section(&requests);
        assert_eq!(groups.len(), 2);
        let total: usize = groups.iter().map(|group| group.requests.len()).sum();
        assert_eq!(total, requests.len());

        let merged = &groups[1];
        assert_eq!(merged.key, GroupKey::new("2023-2027", "A"));
        let names: Vec<_> = merged
            .requests
            .iter()
            .map(|r| r.student_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);

        assert_eq!(groups[0].key, GroupKey::new(UNKNOWN_BATCH, UNKNOWN_SECTION));
    }

    #[test]
    fn status_partition_skips_rejected() {
        let requests = vec![
            leave("approved", "2023-2027", "B").with_status(Status::Approved),
            leave("pending-b", "2023-2027", "B"),
            leave("pending-a", "2023-2027", "A"),
            leave("rejected", "2022-2026", "A").with_status(Status::Rejected),
        ];

        let batches = partition_by_status(&requests);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch, "2023-2027");
        assert_eq!(batches[0].approved.len(), 1);
        let pending: Vec<_> = batches[0]
            .pending
            .iter()
            .map(|r| r.student_name.as_str())
            .collect();
        assert_eq!(pending, vec!["pending-a", "pending-b"]);
    }

    #[test]
    fn section_sort_is_stable() {
        let first = leave("first", "X", "B");
        let second = leave("second", "X", "A");
        let third = leave("third", "X", "B");
        let mut requests = vec![&first, &second, &third];
        sort_by_section(&mut requests);
        let names: Vec<_> = requests.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["second", "first", "third"]);
    }

    #[test]
    fn resolved_defaulters_are_dropped() {
        let defaulters = vec![
            Defaulter::new("done", "1")
                .with_group("2023-2027", "A")
                .resolved(true),
            Defaulter::new("older", "2").with_group("2022-2026", "A"),
            Defaulter::new("newer", "3").with_group("2023-2027", "B"),
        ];

        let names: Vec<_> = sort_defaulters(&defaulters)
            .into_iter()
            .map(|d| d.student_name.as_str())
            .collect();
        assert_eq!(names, vec!["newer", "older"]);
    }
}
