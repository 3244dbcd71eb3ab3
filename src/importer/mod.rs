//! Adding resources to the catalog: one at a time through prompts, or in
//! bulk from batch YAML files. Both paths check the URL index for
//! duplicates and keep it up to date.

pub mod add;
pub mod batch;
pub mod entry;
pub mod prompt;

pub use add::{format_tags, AddOutcome, ResourceAdder, ResourceDraft};
pub use batch::{
    expand_inputs, write_sample_batch, BatchImporter, DuplicatePair, DuplicatePolicy,
    ImportOptions, ImportReport,
};
pub use entry::{raw_name, suggest_name, validate_entry, validate_url, ResourceError};
pub use prompt::{confirm, Prompter, ScriptedPrompter, TerminalPrompter};
