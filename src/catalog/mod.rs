//! The resource catalog.
//!
//! # File Layout
//!
//! ```text
//! resources.yml
//! └── resources:
//!     ├── name / title
//!     ├── url
//!     ├── description / summary
//!     └── tags: [category/subcategory/...]
//! ```

pub mod resource;
pub mod store;
pub mod tree;

pub use resource::{file_digest, validate_structure, CatalogError, Resource, ResourceFile};
pub use store::{append_resources, write_atomic, CatalogLock};
pub use tree::{tag_segments, CategoriesView, TagTree, TreeView};
