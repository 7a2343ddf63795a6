//! Row-wise report import.

use ekos_types::{Conformity, NewReport, ProjectRef};
use serde::{Deserialize, Serialize};

/// One data row of an import sheet, already split into cells.
///
/// Column order of the sheet template: equipment name, category, company,
/// location, brand/model, serial number, subcategory, period, valid until,
/// conformity, notes, city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportRow {
    pub equipment_name: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,
    pub subcategory: Option<String>,
    pub period: Option<String>,
    pub valid_until: Option<String>,
    pub conformity: Option<String>,
    pub notes: Option<String>,
    pub city: Option<String>,
}

/// Outcome of [`ReportRegistry::import_rows`](crate::ReportRegistry::import_rows).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// One `Row N: reason` line per rejected row.
    pub errors: Vec<String>,
}

impl ImportRow {
    fn cells(&self) -> [Option<&str>; 12] {
        [
            self.equipment_name.as_deref(),
            self.category.as_deref(),
            self.company.as_deref(),
            self.location.as_deref(),
            self.brand_model.as_deref(),
            self.serial_number.as_deref(),
            self.subcategory.as_deref(),
            self.period.as_deref(),
            self.valid_until.as_deref(),
            self.conformity.as_deref(),
            self.notes.as_deref(),
            self.city.as_deref(),
        ]
    }

    /// Returns whether every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells().into_iter().all(|cell| present(cell).is_none())
    }

    /// Converts the row into creation input for `project`.
    ///
    /// Returns the reason the row is rejected on failure.
    pub(crate) fn into_new_report(self, project: ProjectRef) -> Result<NewReport, String> {
        let (Some(equipment_name), Some(category), Some(company)) = (
            present(self.equipment_name.as_deref()),
            present(self.category.as_deref()),
            present(self.company.as_deref()),
        ) else {
            return Err("missing required fields".to_string());
        };

        let conformity = match present(self.conformity.as_deref()) {
            Some(label) => Some(
                parse_conformity(&label)
                    .ok_or_else(|| format!("unrecognized conformity '{label}'"))?,
            ),
            None => None,
        };

        let mut input = NewReport::new(
            project,
            present(self.city.as_deref()).unwrap_or_default(),
            equipment_name,
            category,
            company,
        );
        input.location = present(self.location.as_deref());
        input.brand_model = present(self.brand_model.as_deref());
        input.serial_number = present(self.serial_number.as_deref());
        input.subcategory = present(self.subcategory.as_deref());
        input.period = present(self.period.as_deref());
        input.valid_until = present(self.valid_until.as_deref());
        input.notes = present(self.notes.as_deref());
        input.conformity = conformity;
        Ok(input)
    }
}

fn present(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts the English labels and the Turkish ones used on printed sheets.
fn parse_conformity(label: &str) -> Option<Conformity> {
    match label.to_lowercase().as_str() {
        "conforming" | "uygun" => Some(Conformity::Conforming),
        "non-conforming" | "nonconforming" | "uygun değil" | "uygun degil" => {
            Some(Conformity::NonConforming)
        }
        _ => None,
    }
}
