use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, error};
use tokio::{sync::watch, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    error::{DataError, Result},
    models::Category,
    storage::Storage,
    validators::{validate_category_input, validate_category_patch, CategoryInput, CategoryPatch},
};

use super::SAVE_DEBOUNCE;

const STORAGE_KEY: &str = "categories:v1";

/// Owns the in-memory category list. Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct CategoriesRepository {
    storage: Storage,
    state: Arc<watch::Sender<Vec<Category>>>,
    save_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl CategoriesRepository {
    pub fn new(storage: Storage) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            storage,
            state: Arc::new(state),
            save_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Replaces in-memory state with the persisted list (empty if absent or
    /// unreadable as a category array). Call once before any other operation.
    pub async fn load(&self) -> Result<()> {
        let list: Vec<Category> = self.storage.get(STORAGE_KEY, Vec::new()).await?;
        debug!("loaded {} categories", list.len());
        self.state.send_replace(list);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Category> {
        self.state.borrow().clone()
    }

    /// Subscribes to the category list. The receiver holds the current
    /// value immediately.
    pub fn watch(&self) -> watch::Receiver<Vec<Category>> {
        self.state.subscribe()
    }

    /// Creates a category and prepends it to the list. Names are unique
    /// case-insensitively across the whole collection.
    pub async fn create(&self, input: CategoryInput) -> Result<Category> {
        let parsed = validate_category_input(&input)?;

        if self.name_taken(&parsed.name, None) {
            return Err(DataError::Duplicate(
                "A category with that name already exists".into(),
            ));
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: parsed.name,
            color: parsed.color,
            created_at: now,
            updated_at: now,
        };

        self.state
            .send_modify(|categories| categories.insert(0, category.clone()));
        self.schedule_save();
        Ok(category)
    }

    /// Merges present patch fields onto the category with `id`. A new name
    /// must not collide case-insensitively with a *different* category, so
    /// renaming to a case-variant of the current name succeeds. Unknown id
    /// is a silent no-op.
    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Result<()> {
        if !self.state.borrow().iter().any(|c| c.id == id) {
            return Ok(());
        }
        let parsed = validate_category_patch(&patch)?;

        if let Some(name) = &parsed.name {
            if self.name_taken(name, Some(id)) {
                return Err(DataError::Duplicate(
                    "A category with that name already exists".into(),
                ));
            }
        }

        let now = Utc::now();
        self.state.send_modify(|categories| {
            if let Some(category) = categories.iter_mut().find(|c| c.id == id) {
                if let Some(name) = parsed.name {
                    category.name = name;
                }
                if let Some(color) = parsed.color {
                    category.color = Some(color);
                }
                category.updated_at = now;
            }
        });
        self.schedule_save();
        Ok(())
    }

    /// Hard-deletes the category with `id`. Unknown id is a silent no-op.
    ///
    /// Removes the category only; todos still referencing it must be
    /// repaired by `TodosRepository::clear_category` afterwards (the
    /// composition root exposes the combined operation).
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !self.state.borrow().iter().any(|c| c.id == id) {
            return Ok(());
        }
        self.state
            .send_modify(|categories| categories.retain(|c| c.id != id));
        self.schedule_save();
        Ok(())
    }

    fn name_taken(&self, name: &str, exclude_id: Option<&str>) -> bool {
        let lowered = name.to_lowercase();
        self.state
            .borrow()
            .iter()
            .any(|c| Some(c.id.as_str()) != exclude_id && c.name.to_lowercase() == lowered)
    }

    fn schedule_save(&self) {
        let mut pending = self.save_timer.lock().unwrap();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let storage = self.storage.clone();
        let state = Arc::clone(&self.state);
        *pending = Some(tokio::spawn(async move {
            time::sleep(SAVE_DEBOUNCE).await;
            let snapshot = state.borrow().clone();
            if let Err(err) = storage.set(STORAGE_KEY, &snapshot).await {
                error!("Failed to persist categories: {err:#}");
            }
        }));
    }
}
