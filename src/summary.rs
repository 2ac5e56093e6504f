//! Daily department summary shown on the dashboard.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::grouping;
use crate::records::{Request, Snapshot, Status};

/// Request counts of one kind for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn tally<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a Request>,
    {
        requests
            .into_iter()
            .fold(Self::default(), |mut counts, request| {
                counts.total += 1;
                match request.status {
                    Status::Approved => counts.approved += 1,
                    Status::Pending => counts.pending += 1,
                    Status::Rejected => counts.rejected += 1,
                    Status::Unknown => {}
                }
                counts
            })
    }
}

/// Students away on approved or pending requests, per batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchAbsence {
    pub batch: String,
    pub on_leave: usize,
    pub on_duty: usize,
}

/// Department figures for one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub leave: StatusCounts,
    pub on_duty: StatusCounts,
    pub open_defaulters: usize,
    /// Batches in report order (descending).
    pub batches: Vec<BatchAbsence>,
}

impl DailySummary {
    pub fn compute(snapshot: &Snapshot, day: NaiveDate) -> Self {
        let leave = dates::active_on(&snapshot.leave_requests, day);
        let on_duty = dates::active_on(&snapshot.od_requests, day);

        let mut batches: BTreeMap<Reverse<String>, BatchAbsence> = BTreeMap::new();
        for (requests, is_leave) in [(&leave, true), (&on_duty, false)] {
            for batch in grouping::partition_by_status(requests.iter().copied()) {
                let away = batch.approved.len() + batch.pending.len();
                let entry = batches
                    .entry(Reverse(batch.batch.clone()))
                    .or_insert_with(|| BatchAbsence {
                        batch: batch.batch.clone(),
                        on_leave: 0,
                        on_duty: 0,
                    });
                if is_leave {
                    entry.on_leave += away;
                } else {
                    entry.on_duty += away;
                }
            }
        }

        Self {
            date: day,
            leave: StatusCounts::tally(leave.iter().copied()),
            on_duty: StatusCounts::tally(on_duty.iter().copied()),
            open_defaulters: grouping::sort_defaulters(&snapshot.defaulters).len(),
            batches: batches.into_values().collect(),
        }
    }
}

impl fmt::Display for DailySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary for {}", dates::display_day(self.date))?;
        for (label, counts) in [("Leave", &self.leave), ("OD", &self.on_duty)] {
            writeln!(
                f,
                "  {:<6} total {:>3}  approved {:>3}  pending {:>3}  rejected {:>3}",
                label, counts.total, counts.approved, counts.pending, counts.rejected
            )?;
        }
        writeln!(f, "  Open defaulters: {}", self.open_defaulters)?;
        for batch in &self.batches {
            writeln!(
                f,
                "  {:<12} on leave {:>3}  on duty {:>3}",
                batch.batch, batch.on_leave, batch.on_duty
            )?;
        }
        Ok(())
    }
}
