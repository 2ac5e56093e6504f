//! Daily leave and on-duty reports for a department HOD.
//!
//! The pipeline runs in four steps. Raw backend records are ingested into [`records::Snapshot`].
//! [`dates`] keeps the requests active on the report day and [`grouping`] orders them by batch
//! and section. [`planner::Planner`] lays the result out as a [`model::ReportPlan`], which an
//! [`emitter::DocumentEmitter`] draws: [`builder::PdfEmitter`] for PDF, [`emitter::TextEmitter`]
//! for plain text.
//!
//! ```no_run
//! use hod_reports::{Planner, ReportConfig, Snapshot, TextEmitter};
//!
//! # fn main() -> Result<(), hod_reports::ReportError> {
//! let snapshot = Snapshot::from_json(&std::fs::read_to_string("snapshot.json")?)?;
//! let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let config = ReportConfig::new("CSE");
//! let plan = Planner::new(&config).plan_daily_report(&snapshot, day);
//! println!("{}", TextEmitter::new().render(&plan));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod dates;
pub mod elements;
pub mod emitter;
pub mod error;
pub mod fonts;
pub mod grouping;
pub mod model;
pub mod planner;
pub mod records;
pub mod review;
pub mod richtext;
pub mod summary;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{PdfEmitter, RenderedPdf};
pub use config::ReportConfig;
pub use emitter::{DocumentEmitter, TextEmitter};
pub use error::ReportError;
pub use model::ReportPlan;
pub use planner::{BatchSelection, Planner};
pub use records::Snapshot;
pub use summary::DailySummary;
