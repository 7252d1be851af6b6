//! Category repository.

use std::collections::BTreeSet;
use std::sync::Arc;

use planbook_core::category::{Category, CategoryTree, CreateCategoryInput, validate_name};
use planbook_core::{Clock, PlanningError};
use planbook_shared::types::CategoryId;
use tracing::info;

use crate::store::PlanningStore;

/// Category administration and tree queries.
#[derive(Clone)]
pub struct CategoryRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Snapshot of the whole tree.
    pub fn tree(&self) -> CategoryTree {
        CategoryTree::new(self.store.categories.values())
    }

    /// Gets a category by id.
    pub fn get(&self, id: CategoryId) -> Result<Category, PlanningError> {
        self.store.categories.require(&id)
    }

    /// All categories, sorted by name.
    pub fn list(&self) -> Vec<Category> {
        let mut all = self.store.categories.values();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Creates a category under an existing parent or as a root.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad name, `NotFound` for an unknown parent,
    /// `InactiveReference` for an inactive parent, `DuplicateName` if the
    /// name is taken.
    pub fn create(&self, input: CreateCategoryInput) -> Result<Category, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        self.tree().check_active_parent(input.parent_id)?;
        let category = Category::create(input, now)?;
        self.claim_name(&category.name, category.id)?;
        self.store.categories.insert_new(category.id, category.clone());

        info!(
            category_id = %category.id,
            name = %category.name,
            parent_id = ?category.parent_id,
            "Category created"
        );
        Ok(category)
    }

    /// Renames a category.
    pub fn rename(&self, id: CategoryId, name: &str) -> Result<Category, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let name = validate_name(name)?;
        let old = self.store.categories.require(&id)?;
        self.claim_name(&name, id)?;
        let updated = self.store.categories.update(&id, |c| {
            c.name.clone_from(&name);
            c.updated_at = now;
            Ok(c.clone())
        })?;
        if old.name != updated.name {
            self.store.category_names.release(&old.name, id);
        }

        info!(category_id = %id, from = %old.name, to = %updated.name, "Category renamed");
        Ok(updated)
    }

    /// Moves a category under `new_parent`, or to the root with `None`.
    ///
    /// # Errors
    ///
    /// `Cycle` if the category would become its own ancestor,
    /// `InactiveReference` when moving an active category under an inactive
    /// parent.
    pub fn reparent(
        &self,
        id: CategoryId,
        new_parent: Option<CategoryId>,
    ) -> Result<Category, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let tree = self.tree();
        let category = tree.require(id)?;
        if let Some(parent) = new_parent {
            tree.assert_no_cycle(id, parent)?;
        }
        if category.is_active {
            tree.check_active_parent(new_parent)?;
        }
        let updated = self.store.categories.update(&id, |c| {
            c.parent_id = new_parent;
            c.updated_at = now;
            Ok(c.clone())
        })?;

        info!(category_id = %id, parent_id = ?new_parent, "Category re-parented");
        Ok(updated)
    }

    /// Activates or deactivates a category.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` when deactivating while active children exist,
    /// `InactiveReference` when activating under an inactive parent.
    pub fn set_active(&self, id: CategoryId, active: bool) -> Result<Category, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let tree = self.tree();
        if active {
            tree.check_active_parent(tree.require(id)?.parent_id)?;
        } else {
            tree.check_deactivate(id)?;
        }
        let updated = self.store.categories.update(&id, |c| {
            c.is_active = active;
            c.updated_at = now;
            Ok(c.clone())
        })?;

        info!(category_id = %id, active, "Category activity changed");
        Ok(updated)
    }

    /// Sets whether amounts for the category are planned per division.
    pub fn set_structure_planned(
        &self,
        id: CategoryId,
        structure_planned: bool,
    ) -> Result<Category, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        self.store.categories.update(&id, |c| {
            c.structure_planned = structure_planned;
            c.updated_at = now;
            Ok(c.clone())
        })
    }

    /// Protected delete.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` while children, accounts or an indicator
    /// binding reference the category.
    pub fn delete(&self, id: CategoryId) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let accounts = self.store.accounts.count(|a| a.category_id == id);
        let indicators = self.store.indicators.count(|b| b.category_id == id);
        self.tree().check_delete(id, accounts, indicators)?;

        let removed = self.store.categories.remove_checked(&id, |_| Ok(()))?;
        self.store.category_names.release(&removed.name, id);

        info!(category_id = %id, name = %removed.name, "Category deleted");
        Ok(())
    }

    /// Names from the root down to the category.
    pub fn resolve_ancestry_path(&self, id: CategoryId) -> Result<Vec<String>, PlanningError> {
        self.tree().resolve_ancestry_path(id)
    }

    /// Ancestry path joined with ` -> `.
    pub fn display_path(&self, id: CategoryId) -> Result<String, PlanningError> {
        self.tree().display_path(id)
    }

    /// Returns true if `ancestor` lies strictly above `candidate`.
    pub fn is_descendant_of(&self, candidate: CategoryId, ancestor: CategoryId) -> bool {
        self.tree().is_descendant_of(candidate, ancestor)
    }

    /// The category, if active, and its active descendants.
    pub fn active_subtree(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>, PlanningError> {
        self.tree().active_subtree(id)
    }

    fn claim_name(&self, name: &str, id: CategoryId) -> Result<(), PlanningError> {
        self.store
            .category_names
            .claim(name.to_string(), id)
            .map_err(|_| PlanningError::DuplicateName {
                entity: "category name",
                value: name.to_string(),
            })
    }
}
