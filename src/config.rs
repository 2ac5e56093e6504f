//! Report configuration.

use chrono::{Local, NaiveDateTime};

/// Environment variable overriding the font directory search (see [`crate::fonts`]).
pub const FONTS_DIR_ENV: &str = "HOD_REPORTS_FONTS_DIR";
/// Environment variable the CLI reads the default department name from.
pub const DEPARTMENT_ENV: &str = "HOD_REPORTS_DEPARTMENT";

/// Supported paper sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Width and height in millimetres.
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Letter => (215.9, 279.4),
        }
    }
}

/// Settings shared by planning and emission.
///
/// The generation timestamp is part of the configuration rather than read from the clock while
/// planning, so the same configuration and snapshot always produce the same plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    department_name: String,
    institution_name: Option<String>,
    logo_path: Option<String>,
    paper_size: PaperSize,
    margin_mm: f64,
    footer_reserve_mm: f64,
    page_height_override: Option<f64>,
    signature_margin_mm: f64,
    signatories: Vec<String>,
    generated_at: NaiveDateTime,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            department_name: "Department".to_string(),
            institution_name: None,
            logo_path: None,
            paper_size: PaperSize::A4,
            margin_mm: 15.0,
            footer_reserve_mm: 12.0,
            page_height_override: None,
            signature_margin_mm: 45.0,
            signatories: vec!["Head of the Department".to_string()],
            generated_at: Local::now().naive_local(),
        }
    }
}

impl ReportConfig {
    /// Creates a configuration for `department_name`, stamped with the current local time.
    pub fn new(department_name: impl Into<String>) -> Self {
        Self {
            department_name: department_name.into(),
            ..Self::default()
        }
    }

    pub fn department_name(&self) -> &str {
        &self.department_name
    }

    pub fn institution_name(&self) -> Option<&str> {
        self.institution_name.as_deref()
    }

    pub fn logo_path(&self) -> Option<&str> {
        self.logo_path.as_deref()
    }

    pub fn paper_size(&self) -> PaperSize {
        self.paper_size
    }

    pub fn margin_mm(&self) -> f64 {
        self.margin_mm
    }

    /// Space kept free at the bottom of every page for the page footer.
    pub fn footer_reserve_mm(&self) -> f64 {
        self.footer_reserve_mm
    }

    /// Width available to tables.
    pub fn content_width_mm(&self) -> f64 {
        let (width, _) = self.paper_size.dimensions_mm();
        (width - 2.0 * self.margin_mm).max(1.0)
    }

    /// Vertical space the planner may fill on one page before breaking.
    pub fn page_height_mm(&self) -> f64 {
        self.page_height_override.unwrap_or_else(|| {
            let (_, height) = self.paper_size.dimensions_mm();
            (height - 2.0 * self.margin_mm - self.footer_reserve_mm).max(1.0)
        })
    }

    /// Minimum space left on a page for the signature block to stay on it.
    pub fn signature_margin_mm(&self) -> f64 {
        self.signature_margin_mm
    }

    pub fn signatories(&self) -> &[String] {
        &self.signatories
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    /// Timestamp printed in the footer.
    pub fn generated_on_label(&self) -> String {
        self.generated_at.format("%d/%m/%Y %H:%M").to_string()
    }

    pub fn with_department_name(mut self, department_name: impl Into<String>) -> Self {
        self.department_name = department_name.into();
        self
    }

    pub fn with_institution_name(mut self, institution_name: impl Into<Option<String>>) -> Self {
        self.institution_name = institution_name.into();
        self
    }

    pub fn with_logo_path(mut self, logo_path: impl Into<Option<String>>) -> Self {
        self.logo_path = logo_path.into();
        self
    }

    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = paper_size;
        self
    }

    pub fn with_margin_mm(mut self, margin_mm: f64) -> Self {
        self.margin_mm = margin_mm.max(0.0);
        self
    }

    /// Overrides the usable page height, mostly useful to force pagination in tests.
    pub fn with_page_height_mm(mut self, page_height_mm: f64) -> Self {
        self.page_height_override = Some(page_height_mm.max(1.0));
        self
    }

    pub fn with_signature_margin_mm(mut self, signature_margin_mm: f64) -> Self {
        self.signature_margin_mm = signature_margin_mm.max(0.0);
        self
    }

    pub fn with_signatories<I, S>(mut self, signatories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signatories = signatories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Department name usable inside a file name.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .department_name
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        if stem.is_empty() {
            "Department".to_string()
        } else {
            stem
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_page_budget_leaves_room_for_margins_and_footer() {
        let config = ReportConfig::new("CSE");
        assert_eq!(config.content_width_mm(), 180.0);
        assert_eq!(config.page_height_mm(), 297.0 - 30.0 - 12.0);
        assert_eq!(config.with_page_height_mm(50.0).page_height_mm(), 50.0);
    }

    #[test]
    fn oversized_margins_keep_a_usable_page() {
        let config = ReportConfig::new("CSE").with_margin_mm(142.5);
        assert_eq!(config.page_height_mm(), 1.0);
        assert_eq!(config.content_width_mm(), 1.0);
    }

    #[test]
    fn file_stem_replaces_separators() {
        assert_eq!(ReportConfig::new("CSE/AI ML").file_stem(), "CSE_AI ML");
        assert_eq!(ReportConfig::new("  ").file_stem(), "Department");
    }
}
