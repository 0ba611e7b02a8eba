//! Shared data model for document-page templates
//!
//! Templates, their placed variables, data-source catalogs and the
//! record contexts tags are resolved against.

pub mod context;
pub mod source;
pub mod types;

pub use context::RecordContext;
pub use source::{ComputedValue, DataSource, Field, FieldType, TagMapping};
pub use types::{
    DocumentGeometry, PageSize, Position, Size, Template, TemplateSummary, TextAlign, Typography,
    Variable, VariableContent, VariableId, VariableKind, VerticalAlign,
};
