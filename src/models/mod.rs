//! Persisted data models.

mod category;
mod todo;

pub use category::Category;
pub use todo::Todo;
