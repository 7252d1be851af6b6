//! Property-based tests for CategoryTree.

use chrono::Utc;
use proptest::prelude::*;
use planbook_shared::types::CategoryId;

use super::tree::CategoryTree;
use super::types::Category;
use crate::error::PlanningError;

/// Builds a random forest: node `i` picks a parent among nodes `0..i` or none.
fn arb_forest() -> impl Strategy<Value = Vec<Category>> {
    prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), any::<bool>()), 1..24)
        .prop_map(|specs| {
            let mut nodes: Vec<Category> = Vec::with_capacity(specs.len());
            for (i, (pick, has_parent, active)) in specs.into_iter().enumerate() {
                let parent_id = if i > 0 && has_parent {
                    Some(nodes[pick.index(i)].id)
                } else {
                    None
                };
                nodes.push(Category {
                    id: CategoryId::new(),
                    name: format!("category-{i}"),
                    parent_id,
                    is_active: active,
                    structure_planned: false,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                });
            }
            nodes
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Re-parenting any category under itself or one of its descendants fails.
    #[test]
    fn prop_no_category_becomes_its_own_ancestor(nodes in arb_forest()) {
        let tree = CategoryTree::new(nodes.clone());
        for category in &nodes {
            let result = tree.assert_no_cycle(category.id, category.id);
            let is_cycle = matches!(result, Err(PlanningError::Cycle { .. }));
            prop_assert!(is_cycle);

            for other in &nodes {
                let result = tree.assert_no_cycle(category.id, other.id);
                if other.id == category.id || tree.is_descendant_of(other.id, category.id) {
                    prop_assert!(result.is_err());
                } else {
                    prop_assert!(result.is_ok());
                }
            }
        }
    }

    /// The path ends with the category itself and has one element per level.
    #[test]
    fn prop_path_length_matches_depth(nodes in arb_forest()) {
        let tree = CategoryTree::new(nodes.clone());
        for category in &nodes {
            let path = tree.resolve_ancestry_path(category.id).unwrap();
            let depth = tree.ancestors(category.id).unwrap().len();
            prop_assert_eq!(path.len(), depth + 1);
            prop_assert_eq!(path.last(), Some(&category.name));
        }
    }

    /// Every member of an active subtree is active and lies at or below the root.
    #[test]
    fn prop_active_subtree_members_are_active_descendants(nodes in arb_forest()) {
        let tree = CategoryTree::new(nodes.clone());
        for category in &nodes {
            let subtree = tree.active_subtree(category.id).unwrap();
            for member in &subtree {
                let node = tree.get(*member).unwrap();
                prop_assert!(node.is_active);
                prop_assert!(*member == category.id || tree.is_descendant_of(*member, category.id));
            }
        }
    }
}
