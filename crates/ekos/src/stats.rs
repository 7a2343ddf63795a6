//! Dashboard aggregates.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use ekos_types::{Conformity, Report};
use serde::{Deserialize, Serialize};

/// Number of categories listed in [`DashboardStats::top_categories`].
pub const TOP_CATEGORIES: usize = 6;

const VALIDITY_DATE_FORMAT: &str = "%Y-%m-%d";
const VALIDITY_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Reports created since the start of the current UTC month.
    pub monthly: usize,
    pub conforming: usize,
    pub non_conforming: usize,
    /// Reports whose validity date is between today and 30 days from today.
    pub expiring_30_days: usize,
    pub expiring_7_days: usize,
    /// Most common categories, by count then name.
    pub top_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

impl DashboardStats {
    pub fn compute(reports: &[Report], now: DateTime<Utc>) -> Self {
        let month_start = start_of_month(now);
        let today = now.date_naive();
        let in_7_days = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        let in_30_days = today.checked_add_days(Days::new(30)).unwrap_or(NaiveDate::MAX);

        let mut stats = Self {
            total: reports.len(),
            ..Self::default()
        };
        let mut categories: HashMap<&str, usize> = HashMap::new();

        for report in reports {
            if month_start.is_some_and(|start| report.created_at >= start) {
                stats.monthly += 1;
            }
            match report.conformity {
                Some(Conformity::Conforming) => stats.conforming += 1,
                Some(Conformity::NonConforming) => stats.non_conforming += 1,
                None => {}
            }
            if let Some(valid_until) = report.valid_until.as_deref().and_then(parse_validity_date)
            {
                if (today..=in_30_days).contains(&valid_until) {
                    stats.expiring_30_days += 1;
                }
                if (today..=in_7_days).contains(&valid_until) {
                    stats.expiring_7_days += 1;
                }
            }
            *categories.entry(report.category.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<(&str, usize)> = categories.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        stats.top_categories = ranked
            .into_iter()
            .take(TOP_CATEGORIES)
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();

        stats
    }
}

fn start_of_month(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
}

/// Parses a free-text validity date. Unrecognized text yields `None`.
pub fn parse_validity_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, VALIDITY_DATE_FORMAT)
        .ok()
        .or_else(|| {
            VALIDITY_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|at| at.date())
        })
}
