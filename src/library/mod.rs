//! Movie library: the catalog of uploaded files and title resolution.
//!
//! # Storage Layout
//!
//! ```text
//! movies.json                   # { "<title key>": "<telegram file id>", ... }
//! ```

pub mod catalog;
pub mod matcher;
pub mod resolver;

pub use catalog::{derive_key, CatalogError, CatalogStore};
pub use resolver::{resolve, resolve_with, ResolverSettings};
