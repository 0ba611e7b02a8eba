//! Template editing engine
//!
//! Places data-bound and free-text variables on the pages of a document,
//! drives them from pointer events, and resolves `<tag>` placeholders
//! against mission, user and company records.
//!
//! - `geometry`: coordinate transforms, clamping and corner resizing
//! - `store` / `interaction`: the variable collection and the gesture state machine
//! - `catalog` / `resolver`: data sources, tag registrations and substitution
//! - `editor`: one open template with load, save and preview

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod persistence;
pub mod resolver;
pub mod store;

pub use catalog::{FieldCatalog, COMPANY_SOURCE, MISSION_SOURCE, USER_SOURCE};
pub use config::EngineConfig;
pub use editor::{resolve_layout, ResolvedVariable, TemplateEditor};
pub use error::{EngineError, PersistenceError, Result};
pub use geometry::{
    clamp, resize_from_corner, to_page, to_viewport, ClampMode, Corner, Point, Rect, Viewport,
};
pub use interaction::{InteractionController, InteractionState, Outcome, PointerEvent};
pub use persistence::{
    LoadedTemplate, MemoryRepository, PageSource, RecordContextProvider, StaticContextProvider,
    StaticPageSource, TemplateRepository,
};
pub use resolver::{resolve, ResolutionContexts, TagResolver};
pub use store::{Property, VariableStore};
