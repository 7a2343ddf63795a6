//! Project and category catalog operations.
//!
//! Everyone who can read reports can read the catalog; changing it takes
//! [`Permission::ManageCatalog`].

use ekos_allocator::{Clock, NumberAllocator};
use ekos_rbac::{Permission, Principal};
use ekos_store::{CatalogStore, RecordStore, StoreError};
use ekos_types::{Category, Project};
use tracing::info;

use crate::{RegistryError, ReportRegistry, Result};

impl<S, A, C> ReportRegistry<S, A, C>
where
    S: RecordStore + CatalogStore,
    A: NumberAllocator,
    C: Clock,
{
    // ========================================================================
    // Projects
    // ========================================================================

    /// Adds a project to the catalog.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Forbidden`] without catalog permission
    /// - [`RegistryError::EmptyName`] if `name` is blank
    /// - [`RegistryError::Store`] wrapping [`StoreError::DuplicateEntry`] if
    ///   a project with this name exists
    pub fn create_project(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<String>,
    ) -> Result<Project> {
        principal.enforce(Permission::ManageCatalog)?;

        let name = required_name(name, "project")?;
        let project = Project::new(name, description, self.clock.now_utc());
        self.store.insert_project(project.clone())?;

        info!(id = %project.id, name = %project.name, user = %principal.username, "created project");
        Ok(project)
    }

    /// Returns the project named `name`, creating it if it does not exist.
    ///
    /// Creating needs catalog permission; finding does not.
    pub fn ensure_project(&self, principal: &Principal, name: &str) -> Result<Project> {
        principal.enforce(Permission::ReadReports)?;

        let name = required_name(name, "project")?;
        if let Some(project) = self.find_project(name)? {
            return Ok(project);
        }

        match self.create_project(principal, name, None) {
            // Another writer created it between the lookup and the insert.
            Err(RegistryError::Store(StoreError::DuplicateEntry(_))) => self
                .find_project(name)?
                .ok_or_else(|| RegistryError::ProjectNotFound(name.to_string())),
            other => other,
        }
    }

    pub fn projects(&self, principal: &Principal) -> Result<Vec<Project>> {
        principal.enforce(Permission::ReadReports)?;
        Ok(self.store.projects()?)
    }

    /// Removes a project from the catalog.
    ///
    /// Reports already filed under it keep their project reference; new
    /// reports can no longer be filed under it.
    pub fn delete_project(&self, principal: &Principal, id: &str) -> Result<Project> {
        principal.enforce(Permission::ManageCatalog)?;

        let project = self
            .store
            .remove_project(id)?
            .ok_or_else(|| RegistryError::ProjectNotFound(id.to_string()))?;

        info!(%id, name = %project.name, user = %principal.username, "deleted project");
        Ok(project)
    }

    fn find_project(&self, name: &str) -> Result<Option<Project>> {
        Ok(self
            .store
            .projects()?
            .into_iter()
            .find(|project| project.name == name))
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Adds an equipment category with its subcategories.
    ///
    /// Subcategory names are trimmed; blanks and repeats are dropped.
    pub fn create_category(
        &self,
        principal: &Principal,
        name: &str,
        subcategories: Vec<String>,
        description: Option<String>,
    ) -> Result<Category> {
        principal.enforce(Permission::ManageCatalog)?;

        let name = required_name(name, "category")?;
        let mut cleaned: Vec<String> = Vec::with_capacity(subcategories.len());
        for sub in subcategories {
            let sub = sub.trim();
            if !sub.is_empty() && !cleaned.iter().any(|seen| seen == sub) {
                cleaned.push(sub.to_string());
            }
        }

        let category = Category::new(name, cleaned, description, self.clock.now_utc());
        self.store.insert_category(category.clone())?;

        info!(id = %category.id, name = %category.name, user = %principal.username, "created category");
        Ok(category)
    }

    pub fn categories(&self, principal: &Principal) -> Result<Vec<Category>> {
        principal.enforce(Permission::ReadReports)?;
        Ok(self.store.categories()?)
    }

    pub fn delete_category(&self, principal: &Principal, id: &str) -> Result<Category> {
        principal.enforce(Permission::ManageCatalog)?;

        let category = self
            .store
            .remove_category(id)?
            .ok_or_else(|| RegistryError::CategoryNotFound(id.to_string()))?;

        info!(%id, name = %category.name, user = %principal.username, "deleted category");
        Ok(category)
    }
}

fn required_name<'a>(name: &'a str, kind: &'static str) -> Result<&'a str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::EmptyName(kind));
    }
    Ok(name)
}
