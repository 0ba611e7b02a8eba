//! One open template: its store, its interaction controller, and the
//! explicit save that flushes them
//!
//! Editors share nothing, so two open templates never see each other's
//! edits. Saving writes the whole variable list in one call; the last save
//! of a template wins.

use crate::catalog::FieldCatalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::geometry::{Rect, Viewport};
use crate::interaction::{InteractionController, Outcome, PointerEvent};
use crate::persistence::{PageSource, RecordContextProvider, TemplateRepository};
use crate::resolver::{ResolutionContexts, TagResolver};
use crate::store::{Property, VariableStore};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared_types::{
    Position, Size, TextAlign, Typography, Variable, VariableContent, VariableId, VerticalAlign,
};

/// A variable with its display text resolved, ready for compositing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVariable {
    pub id: VariableId,
    pub position: Position,
    pub size: Size,
    /// `[x, y, width, height]` with a bottom-left origin
    pub pdf_rect: [f64; 4],
    pub typography: Typography,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub text: String,
}

pub struct TemplateEditor {
    template_id: String,
    document_ref: String,
    store: VariableStore,
    controller: InteractionController,
}

impl TemplateEditor {
    /// Load a template and its document geometry
    pub async fn open(
        repo: &dyn TemplateRepository,
        pages: &dyn PageSource,
        template_id: &str,
        config: EngineConfig,
    ) -> Result<Self> {
        let loaded = repo.load_template(template_id).await?;
        let geometry = pages.load_document(&loaded.document_ref).await?;
        if geometry.page_count() == 0 {
            return Err(EngineError::validation(format!(
                "document '{}' has no pages",
                loaded.document_ref
            )));
        }

        let store = VariableStore::from_variables(geometry, config, loaded.variables)?;
        tracing::info!(
            template_id,
            variables = store.len(),
            "opened template on {}",
            loaded.document_ref
        );
        Ok(Self::with_store(template_id, loaded.document_ref, store))
    }

    pub fn with_store(
        template_id: impl Into<String>,
        document_ref: impl Into<String>,
        store: VariableStore,
    ) -> Self {
        let controller = InteractionController::new(Viewport::default(), 1, store.config());
        Self {
            template_id: template_id.into(),
            document_ref: document_ref.into(),
            store,
            controller,
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn document_ref(&self) -> &str {
        &self.document_ref
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut InteractionController {
        &mut self.controller
    }

    pub fn arm(&mut self, content: VariableContent) -> Result<()> {
        self.controller.arm(content)
    }

    pub fn handle(&mut self, event: PointerEvent) -> Result<Outcome> {
        self.controller.handle(&mut self.store, event)
    }

    pub fn active_selection(&self) -> Option<&VariableId> {
        self.controller.active_selection()
    }

    /// Apply a property edit to the active selection
    pub fn set_selected_property(&mut self, property: Property) -> Result<()> {
        let id = self
            .controller
            .active_selection()
            .cloned()
            .ok_or_else(|| EngineError::validation("no variable is selected"))?;
        self.store.set_property(&id, property)
    }

    pub fn remove(&mut self, id: &VariableId) -> Result<Variable> {
        let removed = self.store.remove(id)?;
        self.controller.forget(id);
        Ok(removed)
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    /// Write the full variable list. The dirty flag is cleared only on
    /// success; failures are returned as-is and never retried here.
    pub async fn save(&mut self, repo: &dyn TemplateRepository) -> Result<()> {
        match repo
            .save_template_variables(&self.template_id, self.store.variables())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    template_id = %self.template_id,
                    variables = self.store.len(),
                    "saved template"
                );
                self.store.mark_clean();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(template_id = %self.template_id, "save failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Resolve every variable against `contexts`, dating computed fields today
    pub fn preview(
        &self,
        catalog: &FieldCatalog,
        contexts: &ResolutionContexts,
    ) -> Vec<ResolvedVariable> {
        self.preview_on(catalog, contexts, Local::now().date_naive())
    }

    pub fn preview_on(
        &self,
        catalog: &FieldCatalog,
        contexts: &ResolutionContexts,
        today: NaiveDate,
    ) -> Vec<ResolvedVariable> {
        resolve_layout(&self.store, catalog, contexts, today)
    }

    pub fn preview_with(
        &self,
        catalog: &FieldCatalog,
        provider: &dyn RecordContextProvider,
    ) -> Vec<ResolvedVariable> {
        self.preview(catalog, &ResolutionContexts::from_provider(provider))
    }
}

/// Resolve all variables of a store in paint order
pub fn resolve_layout(
    store: &VariableStore,
    catalog: &FieldCatalog,
    contexts: &ResolutionContexts,
    today: NaiveDate,
) -> Vec<ResolvedVariable> {
    let resolver = TagResolver::new(catalog, store.config());

    store
        .variables()
        .iter()
        .map(|variable| {
            let text = match &variable.content {
                VariableContent::BoundField {
                    data_source_id,
                    field_id,
                } => resolver.field_value(data_source_id, field_id, contexts, today),
                VariableContent::RawText { text } => resolver.resolve_on(text, contexts, today),
            };

            let rect = Rect::of(variable);
            let page_height = store
                .geometry()
                .page(variable.position.page)
                .map(|p| p.height)
                .unwrap_or(rect.bottom());
            let pdf = rect.to_pdf_space(page_height);

            ResolvedVariable {
                id: variable.id.clone(),
                position: variable.position,
                size: variable.size,
                pdf_rect: [pdf.x, pdf.y, pdf.width, pdf.height],
                typography: variable.typography.clone(),
                text_align: variable.text_align,
                vertical_align: variable.vertical_align,
                text,
            }
        })
        .collect()
}
