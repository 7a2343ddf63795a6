//! Report registry: the operations a request handler calls.

use std::sync::Arc;

use ekos_allocator::{
    Clock, CounterAllocator, DEFAULT_MAX_ATTEMPTS, NumberAllocator, SystemClock, insert_with_retry,
};
use ekos_directory::CityDirectory;
use ekos_rbac::{Permission, Principal};
use ekos_store::{CatalogStore, MemoryStore, RecordStore, ReportQuery};
use ekos_types::{NewReport, ProjectRef, Report, ReportId, ReportStatus, ReportUpdate};
use tracing::{info, warn};

use crate::import::{ImportRow, ImportSummary};
use crate::stats::DashboardStats;
use crate::{RegistryError, Result};

/// Report CRUD, import and statistics on top of a store and an allocator.
///
/// Every operation takes the calling [`Principal`] and checks its role
/// before touching the store. Viewers bound to a company only ever see
/// that company's reports. Reports are filed under a project from the
/// catalog; see the catalog operations for managing it.
#[derive(Debug)]
pub struct ReportRegistry<S, A, C> {
    pub(crate) store: Arc<S>,
    allocator: A,
    pub(crate) clock: C,
    max_attempts: u32,
}

/// A registry over an in-memory store, for tests and demos.
pub type MemoryRegistry =
    ReportRegistry<MemoryStore, CounterAllocator<MemoryStore, SystemClock>, SystemClock>;

impl MemoryRegistry {
    /// Creates an empty in-memory registry using the built-in city table.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        let allocator = CounterAllocator::new(
            Arc::clone(&store),
            Arc::new(CityDirectory::turkey()),
            SystemClock::new(),
        );
        Self::new(store, allocator, SystemClock::new())
    }
}

impl<S, A, C> ReportRegistry<S, A, C>
where
    S: RecordStore + CatalogStore,
    A: NumberAllocator,
    C: Clock,
{
    pub fn new(store: Arc<S>, allocator: A, clock: C) -> Self {
        Self {
            store,
            allocator,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets how many number collisions an insert tolerates.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    // ========================================================================
    // Create / Read
    // ========================================================================

    /// Creates a report with a freshly allocated number.
    ///
    /// The project is looked up by `input.project.id`; the stored reference
    /// takes its name from the catalog.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Forbidden`] without write permission
    /// - [`RegistryError::ProjectNotFound`] if the project is not in the catalog
    /// - [`RegistryError::InvalidCity`] if the city is not in the directory
    /// - [`RegistryError::Allocation`] if no number could be allocated
    pub fn create(&self, principal: &Principal, mut input: NewReport) -> Result<Report> {
        principal.enforce(Permission::WriteReports)?;

        input.project = self.resolve_project(&input.project.id)?;
        if self.allocator.city_code(&input.city).is_none() {
            return Err(RegistryError::InvalidCity(input.city));
        }

        let report = self.insert(principal, input)?;
        info!(
            id = %report.id,
            number = %report.report_number,
            user = %principal.username,
            "created report"
        );
        Ok(report)
    }

    pub fn get(&self, principal: &Principal, id: ReportId) -> Result<Report> {
        principal.enforce(Permission::ReadReports)?;

        self.store
            .get(id)?
            .filter(|report| is_visible(principal, report))
            .ok_or(RegistryError::NotFound(id))
    }

    /// Lists reports matching `query`, newest first.
    ///
    /// For company-scoped viewers the company filter is replaced by the
    /// viewer's company.
    pub fn list(&self, principal: &Principal, mut query: ReportQuery) -> Result<Vec<Report>> {
        principal.enforce(Permission::ReadReports)?;

        if let Some(company) = principal.company_scope() {
            query.company = Some(company.to_string());
        }
        Ok(self.store.list(&query)?)
    }

    // ========================================================================
    // Update / Delete
    // ========================================================================

    /// Applies the fields present in `update`. The report number is kept.
    ///
    /// A new project is resolved against the catalog like in [`Self::create`].
    pub fn update(
        &self,
        principal: &Principal,
        id: ReportId,
        mut update: ReportUpdate,
    ) -> Result<Report> {
        principal.enforce(Permission::WriteReports)?;

        if let Some(project) = update.project.as_mut() {
            *project = self.resolve_project(&project.id)?;
        }
        let mut report = self.store.get(id)?.ok_or(RegistryError::NotFound(id))?;
        report.apply(update, self.clock.now_utc());
        self.store.replace(report.clone())?;

        info!(%id, number = %report.report_number, user = %principal.username, "updated report");
        Ok(report)
    }

    /// Deletes a report and returns it. Its number is not reused.
    pub fn delete(&self, principal: &Principal, id: ReportId) -> Result<Report> {
        principal.enforce(Permission::WriteReports)?;

        let report = self.store.remove(id)?.ok_or(RegistryError::NotFound(id))?;
        info!(%id, number = %report.report_number, user = %principal.username, "deleted report");
        Ok(report)
    }

    /// Deletes every listed report that exists and returns how many were removed.
    pub fn bulk_delete(&self, principal: &Principal, ids: &[ReportId]) -> Result<usize> {
        principal.enforce(Permission::WriteReports)?;

        let mut deleted = 0;
        for id in ids {
            if self.store.remove(*id)?.is_some() {
                deleted += 1;
            }
        }

        info!(requested = ids.len(), deleted, user = %principal.username, "bulk deleted reports");
        Ok(deleted)
    }

    /// Flips a report between `Active` and `Passive` and returns the new status.
    pub fn toggle_status(&self, principal: &Principal, id: ReportId) -> Result<ReportStatus> {
        principal.enforce(Permission::WriteReports)?;

        let mut report = self.store.get(id)?.ok_or(RegistryError::NotFound(id))?;
        report.status = report.status.toggled();
        report.updated_at = self.clock.now_utc();
        let status = report.status;
        self.store.replace(report)?;

        info!(%id, ?status, user = %principal.username, "toggled report status");
        Ok(status)
    }

    // ========================================================================
    // Import / Stats
    // ========================================================================

    /// Imports parsed spreadsheet rows into the project `project_id`.
    ///
    /// Row `n` of `rows` is reported as sheet row `n + 2`: row 1 holds the
    /// headers. Blank rows are skipped silently. A row that fails is
    /// recorded in [`ImportSummary::errors`] and the import moves on.
    /// Unlike [`Self::create`], an unknown or missing city does not fail
    /// the row; it is numbered under the fallback code.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Forbidden`] without write permission
    /// - [`RegistryError::ProjectNotFound`] before any row is read if the
    ///   project is not in the catalog
    pub fn import_rows(
        &self,
        principal: &Principal,
        project_id: &str,
        rows: impl IntoIterator<Item = ImportRow>,
    ) -> Result<ImportSummary> {
        principal.enforce(Permission::WriteReports)?;

        let project = self.resolve_project(project_id)?;
        let mut summary = ImportSummary::default();
        for (index, row) in rows.into_iter().enumerate() {
            let sheet_row = index + 2;
            if row.is_blank() {
                continue;
            }

            let outcome = row
                .into_new_report(project.clone())
                .and_then(|input| self.insert(principal, input).map_err(|e| e.to_string()));

            match outcome {
                Ok(_) => summary.imported += 1,
                Err(reason) => {
                    warn!(row = sheet_row, %reason, "skipped import row");
                    summary.errors.push(format!("Row {sheet_row}: {reason}"));
                }
            }
        }

        info!(
            project = %project.name,
            imported = summary.imported,
            failed = summary.errors.len(),
            user = %principal.username,
            "imported reports"
        );
        Ok(summary)
    }

    /// Dashboard figures over every report visible to `principal`.
    pub fn stats(&self, principal: &Principal) -> Result<DashboardStats> {
        principal.enforce(Permission::ReadReports)?;

        let reports: Vec<Report> = self
            .store
            .all()?
            .into_iter()
            .filter(|report| is_visible(principal, report))
            .collect();

        Ok(DashboardStats::compute(&reports, self.clock.now_utc()))
    }

    fn resolve_project(&self, id: &str) -> Result<ProjectRef> {
        self.store
            .project(id)?
            .map(|project| project.reference())
            .ok_or_else(|| RegistryError::ProjectNotFound(id.to_string()))
    }

    fn insert(&self, principal: &Principal, input: NewReport) -> Result<Report> {
        let now = self.clock.now_utc();
        let city = input.city.clone();

        let report = insert_with_retry(
            &self.allocator,
            self.store.as_ref(),
            &city,
            self.max_attempts,
            |number| {
                Report::new(
                    ReportId::generate(),
                    number,
                    input.clone(),
                    &principal.user_id,
                    &principal.username,
                    now,
                )
            },
        )?;
        Ok(report)
    }
}

fn is_visible(principal: &Principal, report: &Report) -> bool {
    principal
        .company_scope()
        .is_none_or(|company| report.company == company)
}
