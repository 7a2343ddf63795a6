//! Store contents shared by every implementation.
//!
//! `StoreState` is plain data with no locking. Implementations hold it
//! under a lock (a mutex, or an exclusive file lock), which is what turns
//! these read-modify-write methods into the atomic operations the store
//! traits promise.
//!
//! Mutating methods either fail before changing anything or succeed
//! completely, so a caller never has to roll a partial change back.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use ekos_types::{Category, Partition, Project, Report, ReportId, ReportNumber, Sequence};
use serde::{Deserialize, Serialize};

use crate::{LatestRecord, ReportQuery, StoreError};

/// Highest value a counter reaches: one past the last valid sequence.
pub(crate) const COUNTER_CEILING: u32 = Sequence::MAX.as_u32() + 1;

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    reports: HashMap<ReportId, Report>,
    /// Unique index: report number -> owning record.
    numbers: HashMap<ReportNumber, ReportId>,
    /// Last issued sequence value per partition.
    counters: HashMap<Partition, u32>,
    projects: BTreeMap<String, Project>,
    categories: BTreeMap<String, Category>,
    /// Set by every method that changed something.
    dirty: bool,
}

/// On-disk form of [`StoreState`].
///
/// Counters are a list because JSON object keys must be strings.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(default)]
    reports: Vec<Report>,
    #[serde(default)]
    counters: Vec<CounterEntry>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CounterEntry {
    partition: Partition,
    last_issued: u32,
}

impl StoreState {
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn insert(&mut self, report: Report) -> Result<(), StoreError> {
        if self.numbers.contains_key(&report.report_number) {
            return Err(StoreError::DuplicateNumber(report.report_number));
        }
        if self.reports.contains_key(&report.id) {
            return Err(StoreError::DuplicateId(report.id));
        }

        self.numbers.insert(report.report_number, report.id);
        self.reports.insert(report.id, report);
        self.dirty = true;

        debug_assert_eq!(self.numbers.len(), self.reports.len());
        Ok(())
    }

    pub(crate) fn get(&self, id: ReportId) -> Option<Report> {
        self.reports.get(&id).cloned()
    }

    pub(crate) fn replace(&mut self, report: Report) -> Result<(), StoreError> {
        let existing = self
            .reports
            .get_mut(&report.id)
            .ok_or(StoreError::NotFound(report.id))?;

        if existing.report_number != report.report_number {
            return Err(StoreError::ImmutableNumber(report.id));
        }

        *existing = report;
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: ReportId) -> Option<Report> {
        let report = self.reports.remove(&id)?;
        self.numbers.remove(&report.report_number);
        self.dirty = true;
        Some(report)
    }

    pub(crate) fn latest_by_prefix(&self, prefix: &str) -> Option<LatestRecord> {
        self.reports
            .values()
            .map(|r| (r.created_at, r.report_number.to_string()))
            .filter(|(_, number)| number.starts_with(prefix))
            .max()
            .map(|(created_at, report_number)| LatestRecord {
                report_number,
                created_at,
            })
    }

    pub(crate) fn list(&self, query: &ReportQuery) -> Vec<Report> {
        let mut matching: Vec<&Report> = self
            .reports
            .values()
            .filter(|r| query.matches(r))
            .collect();
        sort_newest_first(&mut matching);

        matching
            .into_iter()
            .skip(query.skip)
            .take(query.effective_limit())
            .cloned()
            .collect()
    }

    pub(crate) fn all(&self) -> Vec<Report> {
        let mut reports: Vec<&Report> = self.reports.values().collect();
        sort_newest_first(&mut reports);
        reports.into_iter().cloned().collect()
    }

    pub(crate) fn counter(&self, partition: Partition) -> Option<u32> {
        self.counters.get(&partition).copied()
    }

    pub(crate) fn init_counter(&mut self, partition: Partition, value: u32) -> bool {
        if self.counters.contains_key(&partition) {
            return false;
        }
        self.counters.insert(partition, value);
        self.dirty = true;
        true
    }

    /// Increments the counter unless it has reached [`COUNTER_CEILING`].
    pub(crate) fn increment_counter(&mut self, partition: Partition) -> u32 {
        let counter = self.counters.entry(partition).or_insert(0);
        if *counter < COUNTER_CEILING {
            *counter += 1;
            self.dirty = true;
        }
        *counter
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub(crate) fn insert_project(&mut self, project: Project) -> Result<(), StoreError> {
        if self.projects.contains_key(&project.id) {
            return Err(StoreError::DuplicateEntry(project.id));
        }
        if self.projects.values().any(|p| p.name == project.name) {
            return Err(StoreError::DuplicateEntry(project.name));
        }

        self.projects.insert(project.id.clone(), project);
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn project(&self, id: &str) -> Option<Project> {
        self.projects.get(id).cloned()
    }

    pub(crate) fn projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    pub(crate) fn remove_project(&mut self, id: &str) -> Option<Project> {
        let project = self.projects.remove(id)?;
        self.dirty = true;
        Some(project)
    }

    pub(crate) fn insert_category(&mut self, category: Category) -> Result<(), StoreError> {
        if self.categories.contains_key(&category.id) {
            return Err(StoreError::DuplicateEntry(category.id));
        }
        if self.categories.values().any(|c| c.name == category.name) {
            return Err(StoreError::DuplicateEntry(category.name));
        }

        self.categories.insert(category.id.clone(), category);
        self.dirty = true;
        Ok(())
    }

    pub(crate) fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    pub(crate) fn remove_category(&mut self, id: &str) -> Option<Category> {
        let category = self.categories.remove(id)?;
        self.dirty = true;
        Some(category)
    }

    pub(crate) fn to_snapshot(&self) -> Snapshot {
        let mut counters: Vec<CounterEntry> = self
            .counters
            .iter()
            .map(|(partition, last_issued)| CounterEntry {
                partition: *partition,
                last_issued: *last_issued,
            })
            .collect();
        counters.sort_by_key(|c| c.partition);

        let mut reports: Vec<Report> = self.reports.values().cloned().collect();
        reports.sort_by_key(|r| (r.created_at, r.report_number));

        Snapshot {
            reports,
            counters,
            projects: self.projects.values().cloned().collect(),
            categories: self.categories.values().cloned().collect(),
        }
    }

    /// Rebuilds state from a snapshot, re-checking the unique indexes.
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let mut state = Self::default();

        for report in snapshot.reports {
            state
                .insert(report)
                .map_err(|e| StoreError::Corrupt(format!("snapshot violates index: {e}")))?;
        }
        for entry in snapshot.counters {
            if !state.init_counter(entry.partition, entry.last_issued) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate counter for partition {}",
                    entry.partition
                )));
            }
        }
        for project in snapshot.projects {
            state
                .insert_project(project)
                .map_err(|e| StoreError::Corrupt(format!("snapshot violates index: {e}")))?;
        }
        for category in snapshot.categories {
            state
                .insert_category(category)
                .map_err(|e| StoreError::Corrupt(format!("snapshot violates index: {e}")))?;
        }

        state.dirty = false;
        Ok(state)
    }
}

fn sort_newest_first(reports: &mut [&Report]) {
    reports.sort_by_key(|r| Reverse((r.created_at, r.report_number)));
}
