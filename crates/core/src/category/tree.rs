//! Arena-backed category tree.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use planbook_shared::types::CategoryId;

use super::types::{Category, PATH_SEPARATOR};
use crate::error::PlanningError;

/// Read-only snapshot of all categories, indexed by id.
///
/// Built from whatever the store holds at the start of an operation; every
/// query walks the snapshot iteratively and never recurses.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<CategoryId, Category>,
    children: HashMap<CategoryId, Vec<CategoryId>>,
}

impl CategoryTree {
    /// Builds the arena from a set of categories.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let nodes: HashMap<CategoryId, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        let mut children: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
        for node in nodes.values() {
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(node.id);
            }
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }

        Self { nodes, children }
    }

    /// Returns the category with the given id.
    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.nodes.get(&id)
    }

    /// Returns the category or a `NotFound` error.
    pub fn require(&self, id: CategoryId) -> Result<&Category, PlanningError> {
        self.get(id)
            .ok_or_else(|| PlanningError::not_found("category", id))
    }

    /// Number of categories in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the snapshot holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct children of a category.
    #[must_use]
    pub fn children_of(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns true if any direct child is active.
    #[must_use]
    pub fn has_active_children(&self, id: CategoryId) -> bool {
        self.children_of(id)
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .any(|child| child.is_active)
    }

    /// Ancestor ids of a category, nearest parent first.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category or a parent is missing, `Cycle` if the
    /// stored parent chain loops.
    pub fn ancestors(&self, id: CategoryId) -> Result<Vec<CategoryId>, PlanningError> {
        let mut visited = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.require(id)?;

        while let Some(parent) = current.parent_id {
            if !visited.insert(parent) {
                return Err(PlanningError::Cycle {
                    category: current.id,
                    parent,
                });
            }
            chain.push(parent);
            current = self.require(parent)?;
        }

        Ok(chain)
    }

    /// Names from the root down to the category itself.
    pub fn resolve_ancestry_path(&self, id: CategoryId) -> Result<Vec<String>, PlanningError> {
        let mut path = Vec::new();
        for ancestor in self.ancestors(id)?.into_iter().rev() {
            path.push(self.require(ancestor)?.name.clone());
        }
        path.push(self.require(id)?.name.clone());
        Ok(path)
    }

    /// Ancestry path rendered as `Root -> Child -> Leaf`.
    pub fn display_path(&self, id: CategoryId) -> Result<String, PlanningError> {
        Ok(self.resolve_ancestry_path(id)?.join(PATH_SEPARATOR))
    }

    /// Returns true if `ancestor` lies strictly above `candidate`.
    ///
    /// A category is not its own descendant. Unknown ids and corrupted
    /// chains answer `false`.
    #[must_use]
    pub fn is_descendant_of(&self, candidate: CategoryId, ancestor: CategoryId) -> bool {
        self.ancestors(candidate)
            .is_ok_and(|chain| chain.contains(&ancestor))
    }

    /// Fails if making `new_parent` the parent of `category` would create a cycle.
    ///
    /// # Errors
    ///
    /// `Cycle` for self-parenting or when `new_parent` is already a
    /// descendant of `category`; `NotFound` if either id is unknown.
    pub fn assert_no_cycle(
        &self,
        category: CategoryId,
        new_parent: CategoryId,
    ) -> Result<(), PlanningError> {
        self.require(category)?;
        self.require(new_parent)?;

        let cycle = PlanningError::Cycle {
            category,
            parent: new_parent,
        };
        if category == new_parent {
            return Err(cycle);
        }

        // Walk up from the proposed parent; meeting `category` closes a loop.
        let mut visited = HashSet::new();
        let mut current = Some(new_parent);
        while let Some(id) = current {
            if id == category || !visited.insert(id) {
                return Err(cycle);
            }
            current = self.require(id)?.parent_id;
        }

        Ok(())
    }

    /// The category (if active) and every active descendant reachable
    /// without passing through an inactive node.
    pub fn active_subtree(&self, id: CategoryId) -> Result<BTreeSet<CategoryId>, PlanningError> {
        let root = self.require(id)?;
        let mut subtree = BTreeSet::new();
        if !root.is_active {
            return Ok(subtree);
        }

        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !subtree.insert(current) {
                continue;
            }
            for child in self.children_of(current) {
                if self.nodes.get(child).is_some_and(|c| c.is_active) {
                    queue.push_back(*child);
                }
            }
        }

        Ok(subtree)
    }

    /// Checks that an active category may hang under `parent`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown parent, `InactiveReference` if the parent
    /// is inactive.
    pub fn check_active_parent(&self, parent: Option<CategoryId>) -> Result<(), PlanningError> {
        let Some(parent) = parent else {
            return Ok(());
        };
        if self.require(parent)?.is_active {
            Ok(())
        } else {
            Err(PlanningError::InactiveReference {
                entity: "category",
                id: parent.to_string(),
            })
        }
    }

    /// Checks that a category may be deactivated.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` while any direct child is still active.
    pub fn check_deactivate(&self, id: CategoryId) -> Result<(), PlanningError> {
        self.require(id)?;
        if self.has_active_children(id) {
            return Err(PlanningError::protected(
                "category",
                id,
                "it still has active subcategories",
            ));
        }
        Ok(())
    }

    /// Checks that a category may be deleted.
    ///
    /// `account_refs` and `indicator_refs` are counts of live references
    /// supplied by the caller.
    pub fn check_delete(
        &self,
        id: CategoryId,
        account_refs: usize,
        indicator_refs: usize,
    ) -> Result<(), PlanningError> {
        self.require(id)?;
        if !self.children_of(id).is_empty() {
            return Err(PlanningError::protected(
                "category",
                id,
                "it still has subcategories",
            ));
        }
        if account_refs > 0 {
            return Err(PlanningError::protected(
                "category",
                id,
                format!("{account_refs} account(s) reference it"),
            ));
        }
        if indicator_refs > 0 {
            return Err(PlanningError::protected(
                "category",
                id,
                "a performance indicator is bound to it",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(name: &str, parent: Option<&Category>) -> Category {
        Category {
            id: CategoryId::new(),
            name: name.to_string(),
            parent_id: parent.map(|p| p.id),
            is_active: true,
            structure_planned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// assets -> loans -> retail, plus a separate root `expenses`.
    fn sample() -> (CategoryTree, [Category; 4]) {
        let assets = node("Assets", None);
        let loans = node("Loans", Some(&assets));
        let retail = node("Retail loans", Some(&loans));
        let expenses = node("Expenses", None);
        let all = [assets, loans, retail, expenses];
        (CategoryTree::new(all.clone()), all)
    }

    #[test]
    fn test_resolve_ancestry_path() {
        let (tree, [_, _, retail, expenses]) = sample();
        assert_eq!(
            tree.resolve_ancestry_path(retail.id).unwrap(),
            vec!["Assets", "Loans", "Retail loans"]
        );
        assert_eq!(tree.resolve_ancestry_path(expenses.id).unwrap(), vec!["Expenses"]);
        assert_eq!(
            tree.display_path(retail.id).unwrap(),
            "Assets -> Loans -> Retail loans"
        );
    }

    #[test]
    fn test_is_descendant_of() {
        let (tree, [assets, loans, retail, expenses]) = sample();
        assert!(tree.is_descendant_of(retail.id, assets.id));
        assert!(tree.is_descendant_of(loans.id, assets.id));
        assert!(!tree.is_descendant_of(assets.id, retail.id));
        assert!(!tree.is_descendant_of(assets.id, assets.id));
        assert!(!tree.is_descendant_of(retail.id, expenses.id));
    }

    #[test]
    fn test_self_parenting_is_a_cycle() {
        let (tree, [assets, ..]) = sample();
        assert!(matches!(
            tree.assert_no_cycle(assets.id, assets.id),
            Err(PlanningError::Cycle { .. })
        ));
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let (tree, [assets, loans, retail, expenses]) = sample();
        assert!(tree.assert_no_cycle(assets.id, retail.id).is_err());
        assert!(tree.assert_no_cycle(assets.id, loans.id).is_err());
        assert!(tree.assert_no_cycle(assets.id, expenses.id).is_ok());
        assert!(tree.assert_no_cycle(retail.id, expenses.id).is_ok());
    }

    #[test]
    fn test_unknown_parent_not_found() {
        let (tree, [assets, ..]) = sample();
        assert!(matches!(
            tree.assert_no_cycle(assets.id, CategoryId::new()),
            Err(PlanningError::NotFound { .. })
        ));
    }

    #[test]
    fn test_corrupted_chain_reported_as_cycle() {
        let mut a = node("A", None);
        let b = node("B", Some(&a));
        a.parent_id = Some(b.id);
        let tree = CategoryTree::new([a.clone(), b]);
        assert!(matches!(
            tree.resolve_ancestry_path(a.id),
            Err(PlanningError::Cycle { .. })
        ));
    }

    #[test]
    fn test_active_subtree_skips_inactive_branches() {
        let assets = node("Assets", None);
        let mut loans = node("Loans", Some(&assets));
        let retail = node("Retail", Some(&loans));
        let securities = node("Securities", Some(&assets));
        loans.is_active = false;
        let tree = CategoryTree::new([assets.clone(), loans, retail, securities.clone()]);

        let subtree = tree.active_subtree(assets.id).unwrap();
        assert_eq!(subtree, BTreeSet::from([assets.id, securities.id]));
    }

    #[test]
    fn test_inactive_root_has_empty_subtree() {
        let mut root = node("Root", None);
        root.is_active = false;
        let tree = CategoryTree::new([root.clone()]);
        assert!(tree.active_subtree(root.id).unwrap().is_empty());
    }

    #[test]
    fn test_check_active_parent() {
        let (_, [assets, loans, ..]) = sample();
        let mut closed = node("Closed", None);
        closed.is_active = false;
        let tree = CategoryTree::new([assets.clone(), loans, closed.clone()]);

        assert!(tree.check_active_parent(None).is_ok());
        assert!(tree.check_active_parent(Some(assets.id)).is_ok());
        assert!(matches!(
            tree.check_active_parent(Some(closed.id)),
            Err(PlanningError::InactiveReference { entity: "category", .. })
        ));
        assert!(matches!(
            tree.check_active_parent(Some(CategoryId::new())),
            Err(PlanningError::NotFound { .. })
        ));
    }

    #[test]
    fn test_check_deactivate_with_active_children() {
        let (tree, [assets, _, retail, _]) = sample();
        assert!(matches!(
            tree.check_deactivate(assets.id),
            Err(PlanningError::ReferentialIntegrity { .. })
        ));
        assert!(tree.check_deactivate(retail.id).is_ok());
    }

    #[test]
    fn test_check_delete() {
        let (tree, [assets, _, retail, expenses]) = sample();
        assert!(tree.check_delete(assets.id, 0, 0).is_err());
        assert!(tree.check_delete(retail.id, 2, 0).is_err());
        assert!(tree.check_delete(expenses.id, 0, 1).is_err());
        assert!(tree.check_delete(expenses.id, 0, 0).is_ok());
    }
}
