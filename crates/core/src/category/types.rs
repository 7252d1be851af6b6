//! Category data types.

use chrono::{DateTime, Utc};
use planbook_shared::types::CategoryId;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Separator used when rendering an ancestry path.
pub const PATH_SEPARATOR: &str = " -> ";

/// Longest accepted category name.
const MAX_NAME_LEN: usize = 255;

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Unique name.
    pub name: String,
    /// Parent category, `None` for a root.
    pub parent_id: Option<CategoryId>,
    /// Soft-deactivation flag.
    pub is_active: bool,
    /// Whether amounts are entered per structural division rather than centrally.
    pub structure_planned: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Builds a new active category from validated input.
    pub fn create(input: CreateCategoryInput, now: DateTime<Utc>) -> Result<Self, PlanningError> {
        Ok(Self {
            id: CategoryId::new(),
            name: validate_name(&input.name)?,
            parent_id: input.parent_id,
            is_active: true,
            structure_planned: input.structure_planned,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Unique name.
    pub name: String,
    /// Optional parent.
    pub parent_id: Option<CategoryId>,
    /// Whether accounts of this category are planned by structural divisions.
    pub structure_planned: bool,
}

/// Trims a category name and checks it is non-empty and not too long.
pub fn validate_name(name: &str) -> Result<String, PlanningError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlanningError::Validation(
            "category name must not be empty".into(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(PlanningError::Validation(format!(
            "category name is longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
