//! Local-first data core for the Tasklight task manager.
//!
//! Two reactive repositories (todos and categories) hold the authoritative
//! in-memory state, validate and normalize input, publish every change to
//! `watch` subscribers, and persist debounced snapshots to a pluggable
//! key-value store. [`AppData`] is the composition root wiring it together.

mod error;
mod flags;
mod models;
mod repos;
mod storage;
mod validators;

pub use error::{DataError, Result};
pub use flags::{AppFlags, FeatureFlags};
pub use models::{Category, Todo};
pub use repos::{CategoriesRepository, TodosRepository};
pub use storage::{FileBackend, MemoryBackend, Storage, StorageBackend};
pub use validators::{
    CategoryInput, CategoryPatch, TodoInput, TodoPatch, NAME_MAX_CHARS, TITLE_MAX_CHARS,
};

use log::info;

/// Composition root: one shared instance of each repository plus the
/// feature-flag handle. Construct once at startup and clone handles into
/// whatever needs them.
#[derive(Clone, Debug)]
pub struct AppData {
    pub todos: TodosRepository,
    pub categories: CategoriesRepository,
    pub flags: FeatureFlags,
}

impl AppData {
    /// Initializes the backend and loads both repositories. Nothing else
    /// should touch the repositories until this returns.
    pub async fn init(storage: Storage) -> Result<Self> {
        storage.init().await?;

        let todos = TodosRepository::new(storage.clone());
        let categories = CategoriesRepository::new(storage);
        todos.load().await?;
        categories.load().await?;
        info!("data core initialized");

        Ok(Self {
            todos,
            categories,
            flags: FeatureFlags::default(),
        })
    }

    /// Deletes a category and repairs referential integrity by clearing the
    /// reference on every todo that pointed at it.
    ///
    /// The two steps are sequential, not transactional: if clearing fails
    /// the category is already gone and the error surfaces to the caller.
    pub async fn remove_category(&self, id: &str) -> Result<()> {
        self.categories.remove(id).await?;
        self.todos.clear_category(id).await
    }
}
