//! Input normalization and validation.
//!
//! Pure functions: each takes a raw input, returns either a normalized copy
//! or the first violated rule as [`DataError::Validation`]. Nothing here
//! touches repository state.

use crate::error::{DataError, Result};

pub const TITLE_MAX_CHARS: usize = 80;
pub const NAME_MAX_CHARS: usize = 30;

/// Raw input for creating a todo.
#[derive(Debug, Clone, Default)]
pub struct TodoInput {
    pub title: String,
    pub category_id: Option<String>,
}

/// Partial update for a todo. The double option on `category_id`
/// distinguishes "leave untouched" (`None`) from "clear the reference"
/// (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub category_id: Option<Option<String>>,
}

/// Raw input for creating a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    pub color: Option<String>,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Trims and collapses internal whitespace runs to single spaces.
pub(crate) fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn validate_title(raw: &str) -> Result<String> {
    let title = normalize(raw);
    if title.is_empty() {
        return Err(DataError::Validation("Title is required".into()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DataError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title)
}

fn validate_name(raw: &str) -> Result<String> {
    let name = normalize(raw);
    if name.is_empty() {
        return Err(DataError::Validation("Name is required".into()));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(DataError::Validation(format!(
            "Name must be at most {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name)
}

pub fn validate_todo_input(input: &TodoInput) -> Result<TodoInput> {
    Ok(TodoInput {
        title: validate_title(&input.title)?,
        category_id: input.category_id.as_deref().map(|id| id.trim().to_string()),
    })
}

pub fn validate_todo_patch(patch: &TodoPatch) -> Result<TodoPatch> {
    Ok(TodoPatch {
        title: patch.title.as_deref().map(validate_title).transpose()?,
        completed: patch.completed,
        category_id: patch
            .category_id
            .clone()
            .map(|inner| inner.map(|id| id.trim().to_string())),
    })
}

pub fn validate_category_input(input: &CategoryInput) -> Result<CategoryInput> {
    Ok(CategoryInput {
        name: validate_name(&input.name)?,
        color: input.color.as_deref().map(|c| c.trim().to_string()),
    })
}

pub fn validate_category_patch(patch: &CategoryPatch) -> Result<CategoryPatch> {
    Ok(CategoryPatch {
        name: patch.name.as_deref().map(validate_name).transpose()?,
        color: patch.color.as_deref().map(|c| c.trim().to_string()),
    })
}
