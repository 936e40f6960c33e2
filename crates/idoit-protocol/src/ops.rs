//! Request and response shapes for each supported method.

pub mod category_read;
pub mod category_save;
pub mod login;
pub mod objects_read;
pub mod raw;

pub use category_read::CategoryRead;
pub use category_save::{CategorySave, CategorySaveResponse};
pub use login::{Login, LoginResponse, Logout, SimpleSuccessResponse};
pub use objects_read::{ObjectDescriptor, ObjectsRead, Ordering, SortDirection};
pub use raw::RawRequest;

/// Known method names.
pub mod names {
    pub const LOGIN: &str = "idoit.login";
    pub const LOGOUT: &str = "idoit.logout";
    pub const OBJECTS_READ: &str = "cmdb.objects.read";
    pub const CATEGORY_READ: &str = "cmdb.category.read";
    pub const CATEGORY_SAVE: &str = "cmdb.category.save";
}
