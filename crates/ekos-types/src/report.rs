//! Report records and their mutation inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CityCode, ReportId, ReportNumber};

/// Lifecycle flag shown as "Active" / "Passive" in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Active,
    Passive,
}

impl ReportStatus {
    /// Returns the opposite status.
    pub fn toggled(self) -> Self {
        match self {
            ReportStatus::Active => ReportStatus::Passive,
            ReportStatus::Passive => ReportStatus::Active,
        }
    }
}

/// Inspection verdict for the equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conformity {
    Conforming,
    NonConforming,
}

/// The project a report belongs to, denormalized onto the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// A stored inspection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub report_number: ReportNumber,
    pub project: ProjectRef,
    pub city: String,
    pub city_code: CityCode,
    pub equipment_name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub brand_model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Inspection interval label, e.g. "6 months".
    #[serde(default)]
    pub period: Option<String>,
    /// Date the inspection stays valid until, as entered.
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub conformity: Option<Conformity>,
    #[serde(default)]
    pub status: ReportStatus,
    pub created_by: String,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Builds a fresh `Active` record from creation input.
    ///
    /// `city_code` is taken from the number, so imported rows numbered under
    /// the fallback code record `XXX` rather than a directory lookup.
    pub fn new(
        id: ReportId,
        report_number: ReportNumber,
        input: NewReport,
        created_by: impl Into<String>,
        created_by_username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            report_number,
            project: input.project,
            city: input.city,
            city_code: report_number.partition().city,
            equipment_name: input.equipment_name,
            category: input.category,
            subcategory: input.subcategory,
            company: input.company,
            location: input.location,
            brand_model: input.brand_model,
            serial_number: input.serial_number,
            period: input.period,
            valid_until: input.valid_until,
            notes: input.notes,
            conformity: input.conformity,
            status: ReportStatus::Active,
            created_by: created_by.into(),
            created_by_username: created_by_username.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update` and refreshes `updated_at`.
    ///
    /// The report number, city and creator are never touched.
    pub fn apply(&mut self, update: ReportUpdate, now: DateTime<Utc>) {
        let ReportUpdate {
            project,
            equipment_name,
            category,
            subcategory,
            company,
            location,
            brand_model,
            serial_number,
            period,
            valid_until,
            notes,
            conformity,
        } = update;

        if let Some(project) = project {
            self.project = project;
        }
        if let Some(equipment_name) = equipment_name {
            self.equipment_name = equipment_name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(company) = company {
            self.company = company;
        }
        if conformity.is_some() {
            self.conformity = conformity;
        }
        for (slot, value) in [
            (&mut self.subcategory, subcategory),
            (&mut self.location, location),
            (&mut self.brand_model, brand_model),
            (&mut self.serial_number, serial_number),
            (&mut self.period, period),
            (&mut self.valid_until, valid_until),
            (&mut self.notes, notes),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }

        self.updated_at = now;
    }
}

/// Input for creating a report. The number is assigned by the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub project: ProjectRef,
    pub city: String,
    pub equipment_name: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub brand_model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub conformity: Option<Conformity>,
}

impl NewReport {
    /// Creates input with the required fields and no optional ones.
    pub fn new(
        project: ProjectRef,
        city: impl Into<String>,
        equipment_name: impl Into<String>,
        category: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            project,
            city: city.into(),
            equipment_name: equipment_name.into(),
            category: category.into(),
            subcategory: None,
            company: company.into(),
            location: None,
            brand_model: None,
            serial_number: None,
            period: None,
            valid_until: None,
            notes: None,
            conformity: None,
        }
    }
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportUpdate {
    pub project: Option<ProjectRef>,
    pub equipment_name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,
    pub period: Option<String>,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub conformity: Option<Conformity>,
}
