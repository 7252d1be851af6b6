//! Hierarchical classification of ledger accounts.
//!
//! Categories form a forest stored as an arena indexed by id. Ancestry is
//! resolved by iterative parent-pointer traversal with a visited set, so a
//! corrupted parent chain is reported instead of looping forever.

pub mod tree;
pub mod types;

#[cfg(test)]
mod tree_props;

pub use tree::CategoryTree;
pub use types::{Category, CreateCategoryInput, PATH_SEPARATOR, validate_name};
