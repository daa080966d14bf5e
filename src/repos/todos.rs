use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, error};
use tokio::{sync::watch, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    error::{DataError, Result},
    models::Todo,
    storage::Storage,
    validators::{validate_todo_input, validate_todo_patch, TodoInput, TodoPatch},
};

use super::SAVE_DEBOUNCE;

const STORAGE_KEY: &str = "todos:v1";

/// Owns the in-memory todo list. Cheap to clone; clones share state.
#[derive(Clone, Debug)]
pub struct TodosRepository {
    storage: Storage,
    state: Arc<watch::Sender<Vec<Todo>>>,
    save_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TodosRepository {
    pub fn new(storage: Storage) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            storage,
            state: Arc::new(state),
            save_timer: Arc::new(Mutex::new(None)),
        }
    }

    /// Replaces in-memory state with the persisted list (empty if absent or
    /// unreadable as a todo array). Call once before any other operation.
    pub async fn load(&self) -> Result<()> {
        let list: Vec<Todo> = self.storage.get(STORAGE_KEY, Vec::new()).await?;
        debug!("loaded {} todos", list.len());
        self.state.send_replace(list);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Todo> {
        self.state.borrow().clone()
    }

    /// Subscribes to the todo list. The receiver holds the current value
    /// immediately; no change is needed before the first read.
    pub fn watch(&self) -> watch::Receiver<Vec<Todo>> {
        self.state.subscribe()
    }

    /// Creates a todo and prepends it to the list.
    ///
    /// Rejects a duplicate when an existing todo carries the same
    /// normalized title within the same category.
    pub async fn create(&self, input: TodoInput) -> Result<Todo> {
        let parsed = validate_todo_input(&input)?;

        let duplicate = self
            .state
            .borrow()
            .iter()
            .any(|t| t.title == parsed.title && t.category_id == parsed.category_id);
        if duplicate {
            return Err(DataError::Duplicate(
                "A todo with that title already exists in that category".into(),
            ));
        }

        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            title: parsed.title,
            completed: false,
            category_id: parsed.category_id,
            created_at: now,
            updated_at: now,
        };

        self.state.send_modify(|todos| todos.insert(0, todo.clone()));
        self.schedule_save();
        Ok(todo)
    }

    /// Merges present patch fields onto the todo with `id` and refreshes
    /// `updated_at`. Unknown id is a silent no-op: nothing published,
    /// nothing scheduled.
    pub async fn update(&self, id: &str, patch: TodoPatch) -> Result<()> {
        if !self.state.borrow().iter().any(|t| t.id == id) {
            return Ok(());
        }
        let parsed = validate_todo_patch(&patch)?;

        let now = Utc::now();
        self.state.send_modify(|todos| {
            if let Some(todo) = todos.iter_mut().find(|t| t.id == id) {
                if let Some(title) = parsed.title {
                    todo.title = title;
                }
                if let Some(completed) = parsed.completed {
                    todo.completed = completed;
                }
                if let Some(category_id) = parsed.category_id {
                    todo.category_id = category_id;
                }
                todo.updated_at = now;
            }
        });
        self.schedule_save();
        Ok(())
    }

    pub async fn toggle_completed(&self, id: &str) -> Result<()> {
        let completed = match self.state.borrow().iter().find(|t| t.id == id) {
            Some(todo) => todo.completed,
            None => return Ok(()),
        };
        self.update(
            id,
            TodoPatch {
                completed: Some(!completed),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard-deletes the todo with `id`. Unknown id is a silent no-op.
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !self.state.borrow().iter().any(|t| t.id == id) {
            return Ok(());
        }
        self.state.send_modify(|todos| todos.retain(|t| t.id != id));
        self.schedule_save();
        Ok(())
    }

    /// Nulls out `category_id` on every todo referencing it, refreshing
    /// their `updated_at`. Idempotent: once no todo references the id,
    /// further calls change nothing.
    pub async fn clear_category(&self, category_id: &str) -> Result<()> {
        let referenced = self
            .state
            .borrow()
            .iter()
            .any(|t| t.category_id.as_deref() == Some(category_id));
        if !referenced {
            return Ok(());
        }

        let now = Utc::now();
        self.state.send_modify(|todos| {
            for todo in todos.iter_mut() {
                if todo.category_id.as_deref() == Some(category_id) {
                    todo.category_id = None;
                    todo.updated_at = now;
                }
            }
        });
        self.schedule_save();
        Ok(())
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
            // Snapshot at fire time, not at scheduling time, so the write
            // reflects every mutation inside the window.
            let snapshot = state.borrow().clone();
            if let Err(err) = storage.set(STORAGE_KEY, &snapshot).await {
                error!("Failed to persist todos: {err:#}");
            }
        }));
    }
}
