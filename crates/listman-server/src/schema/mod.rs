//! API schema types for request/response definitions.
//!
//! Each sub-module defines the request and response types for a specific
//! API domain. Folder references in requests are strings so that `"~"`
//! can name the root; handlers resolve them.

pub mod contacts;
pub mod folders;
pub mod lists;
pub mod locks;
