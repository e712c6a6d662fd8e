pub mod error;
pub mod id;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use error::CoreError;
pub use id::{ContactId, FolderId, ListId};
pub use model::{Contact, ContactList, ContactPayload, Folder, ListKind, ListSource};
pub use validation::{FieldError, FieldErrorCode, ValidationResult};
