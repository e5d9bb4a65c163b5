//! Tasksmith planning core.
//!
//! Turns an execution-order outline into one markdown task document per
//! task, enriches those documents with requirement and test case detail,
//! and keeps them structurally consistent through idempotent normalization
//! passes.

pub mod batch;
pub mod catalog;
pub mod classify;
pub mod document;
pub mod enhance;
pub mod normalize;
pub mod outline;
pub mod rendering;

pub use batch::{
    discover_documents, enhance_dir, extract_to_dir, normalize_dir, run_pipeline,
    write_if_changed, BatchError, BatchReport, FileFailure, FileOutcome, WriteMode,
};
pub use catalog::Placeholders;
pub use classify::{classify, TaskCategory};
pub use document::{Document, Section};
pub use enhance::Enhancer;
pub use normalize::{Normalizer, Pass};
pub use outline::{unresolved_dependencies, OutlineError, OutlineParser, TaskRecord};
pub use rendering::{RenderError, TaskContext, TaskRenderer};
