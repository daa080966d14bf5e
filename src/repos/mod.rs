//! Reactive in-memory repositories.
//!
//! Each repository owns the authoritative list for its entity, publishes
//! every change through a `watch` channel (new subscribers immediately see
//! the current value), and schedules a debounced write of the latest
//! snapshot to storage. Mutations apply synchronously in memory; storage
//! lags behind by at most the debounce window once edits stop.

use std::time::Duration;

mod categories;
mod todos;

pub use categories::CategoriesRepository;
pub use todos::TodosRepository;

/// Quiet period before a pending save fires. Every mutation rearms it.
pub(crate) const SAVE_DEBOUNCE: Duration = Duration::from_millis(350);
