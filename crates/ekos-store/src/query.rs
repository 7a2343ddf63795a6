//! Report listing filters.

use ekos_types::{Conformity, Report, ReportStatus};

/// Filters for [`RecordStore::list`](crate::RecordStore::list).
///
/// All set filters must match. `search` is a case-insensitive substring
/// match against the report number, equipment name and company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub period: Option<String>,
    pub conformity: Option<Conformity>,
    pub company: Option<String>,
    pub status: Option<ReportStatus>,
    pub skip: usize,
    /// Page size; `None` means [`ReportQuery::DEFAULT_LIMIT`].
    pub limit: Option<usize>,
}

impl ReportQuery {
    pub const DEFAULT_LIMIT: usize = 500;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_conformity(mut self, conformity: Conformity) -> Self {
        self.conformity = Some(conformity);
        self
    }

    pub fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    /// Returns whether `report` passes every filter. Paging is not applied.
    pub fn matches(&self, report: &Report) -> bool {
        let exact = |filter: &Option<String>, value: &str| {
            filter.as_deref().is_none_or(|expected| expected == value)
        };
        let optional = |filter: &Option<String>, value: &Option<String>| {
            filter
                .as_deref()
                .is_none_or(|expected| value.as_deref() == Some(expected))
        };

        exact(&self.category, &report.category)
            && exact(&self.company, &report.company)
            && optional(&self.period, &report.period)
            && self
                .conformity
                .is_none_or(|c| report.conformity == Some(c))
            && self.status.is_none_or(|s| report.status == s)
            && self
                .search
                .as_deref()
                .is_none_or(|text| search_matches(text, report))
    }
}

fn search_matches(text: &str, report: &Report) -> bool {
    let needle = text.to_lowercase();
    [
        report.report_number.to_string(),
        report.equipment_name.clone(),
        report.company.clone(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}
