use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{json, Value};
use tasklight::{
    AppData, CategoryInput, DataError, MemoryBackend, Storage, StorageBackend, Todo, TodoInput,
    TodoPatch,
};

fn memory_storage() -> (Arc<MemoryBackend>, Storage) {
    let _ = env_logger::builder().is_test(true).try_init();
    let backend = Arc::new(MemoryBackend::new());
    (backend.clone(), Storage::new(backend))
}

#[tokio::test]
async fn category_lifecycle_scenario() {
    let (_, storage) = memory_storage();
    let app = AppData::init(storage).await.unwrap();

    let work = app
        .categories
        .create(CategoryInput {
            name: "Work".into(),
            color: None,
        })
        .await
        .unwrap();

    let err = app
        .categories
        .create(CategoryInput {
            name: "work".into(),
            color: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    let milk = app
        .todos
        .create(TodoInput {
            title: "Buy milk".into(),
            category_id: Some(work.id.clone()),
        })
        .await
        .unwrap();
    assert_eq!(milk.category_id.as_deref(), Some(work.id.as_str()));

    app.remove_category(&work.id).await.unwrap();

    assert!(app.categories.snapshot().is_empty());
    let repaired = &app.todos.snapshot()[0];
    assert_eq!(repaired.id, milk.id);
    assert_eq!(repaired.category_id, None);
    assert!(repaired.updated_at > milk.updated_at);
}

#[tokio::test]
async fn cascade_leaves_unrelated_todos_alone() {
    let (_, storage) = memory_storage();
    let app = AppData::init(storage).await.unwrap();

    let home = app
        .categories
        .create(CategoryInput {
            name: "Home".into(),
            color: None,
        })
        .await
        .unwrap();
    let other = app
        .categories
        .create(CategoryInput {
            name: "Other".into(),
            color: None,
        })
        .await
        .unwrap();

    app.todos
        .create(TodoInput {
            title: "Mop floor".into(),
            category_id: Some(home.id.clone()),
        })
        .await
        .unwrap();
    let kept = app
        .todos
        .create(TodoInput {
            title: "File taxes".into(),
            category_id: Some(other.id.clone()),
        })
        .await
        .unwrap();

    app.remove_category(&home.id).await.unwrap();

    let todos = app.todos.snapshot();
    assert!(todos.iter().all(|t| t.category_id.as_deref() != Some(home.id.as_str())));
    let untouched = todos.iter().find(|t| t.id == kept.id).unwrap();
    assert_eq!(untouched.category_id.as_deref(), Some(other.id.as_str()));
    assert_eq!(untouched.updated_at, kept.updated_at);
}

#[tokio::test(start_paused = true)]
async fn rapid_mutations_coalesce_to_one_write() {
    let (backend, storage) = memory_storage();
    let app = AppData::init(storage).await.unwrap();

    let todo = app
        .todos
        .create(TodoInput {
            title: "short lived".into(),
            category_id: None,
        })
        .await
        .unwrap();
    app.todos
        .update(
            &todo.id,
            TodoPatch {
                completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.todos.remove(&todo.id).await.unwrap();

    assert_eq!(backend.write_count("todos:v1"), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    tokio::task::yield_now().await;

    assert_eq!(backend.write_count("todos:v1"), 1);
    let stored = backend.read("todos:v1").await.unwrap();
    assert_eq!(stored, Some(json!([])));
}

#[tokio::test(start_paused = true)]
async fn quiet_period_persists_latest_snapshot() {
    let (backend, storage) = memory_storage();
    let app = AppData::init(storage).await.unwrap();

    app.todos
        .create(TodoInput {
            title: "first".into(),
            category_id: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    tokio::task::yield_now().await;
    assert_eq!(backend.write_count("todos:v1"), 1);

    app.todos
        .create(TodoInput {
            title: "second".into(),
            category_id: None,
        })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    tokio::task::yield_now().await;
    assert_eq!(backend.write_count("todos:v1"), 2);

    let stored: Vec<Todo> =
        serde_json::from_value(backend.read("todos:v1").await.unwrap().unwrap()).unwrap();
    let titles: Vec<_> = stored.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn init_loads_previously_persisted_data() {
    let (backend, storage) = memory_storage();
    backend
        .write(
            "todos:v1",
            json!([{
                "id": "t1",
                "title": "Stored",
                "completed": false,
                "categoryId": null,
                "createdAt": 1_700_000_000_000_i64,
                "updatedAt": 1_700_000_000_000_i64
            }]),
        )
        .await
        .unwrap();

    let app = AppData::init(storage).await.unwrap();
    let todos = app.todos.snapshot();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, "t1");
    assert_eq!(todos[0].title, "Stored");
    assert_eq!(todos[0].created_at.timestamp_millis(), 1_700_000_000_000);
}

#[tokio::test]
async fn init_tolerates_garbage_at_a_storage_key() {
    let (backend, storage) = memory_storage();
    backend
        .write("todos:v1", json!({"schema": "unexpected"}))
        .await
        .unwrap();

    let app = AppData::init(storage).await.unwrap();
    assert!(app.todos.snapshot().is_empty());
}

struct FailingBackend;

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn read(&self, _key: &str) -> anyhow::Result<Option<Value>> {
        Err(anyhow!("disk on fire"))
    }

    async fn write(&self, _key: &str, _value: Value) -> anyhow::Result<()> {
        Err(anyhow!("disk on fire"))
    }
}

#[tokio::test]
async fn load_failure_surfaces_as_storage_error() {
    let err = AppData::init(Storage::new(Arc::new(FailingBackend)))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Storage(_)));
}

#[tokio::test(start_paused = true)]
async fn failed_background_save_does_not_roll_back_memory() {
    // Storage dies after init; the in-memory state must keep the mutation.
    struct DeadWrites;

    #[async_trait]
    impl StorageBackend for DeadWrites {
        async fn init(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn read(&self, _key: &str) -> anyhow::Result<Option<Value>> {
            Ok(None)
        }

        async fn write(&self, _key: &str, _value: Value) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    let app = AppData::init(Storage::new(Arc::new(DeadWrites))).await.unwrap();
    app.todos
        .create(TodoInput {
            title: "still here".into(),
            category_id: None,
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    tokio::task::yield_now().await;

    assert_eq!(app.todos.snapshot()[0].title, "still here");
}
