//! Object and category model.

pub mod dialog;
pub mod ids;
pub mod object;

pub use dialog::Dialog;
pub use ids::{CategoryId, ObjectId};
pub use object::{IdoitCategory, IdoitObject};
