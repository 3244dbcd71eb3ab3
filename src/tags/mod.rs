//! Tag management: usage analysis, hierarchy views and format validation.

pub mod analysis;
pub mod hierarchy;
pub mod validate;

pub use analysis::{analyze, export, suggest, tag_category, ExportFormat, TagAnalysis, TagCombination};
pub use hierarchy::{render_tree, CategoryNode, SubcategoryNode, TagHierarchy};
pub use validate::{check_tag, is_valid_tag, validate, TagIssue, TagIssueKind};
