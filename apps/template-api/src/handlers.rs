//! HTTP handlers for the template API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared_types::{DocumentGeometry, Template};
use std::sync::Arc;
use template_engine::{
    PageSource, PersistenceError, TagResolver, TemplateEditor, TemplateRepository, VariableStore,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Result<&'static str, ApiError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;
    Ok("OK")
}

/// List the templates of one scope
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<shared_types::TemplateSummary>>, ApiError> {
    Ok(Json(state.repo.list_templates(&query.scope).await?))
}

/// Register an empty template over an existing source document
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Template name is required".to_string()));
    }
    let geometry = document_geometry(&state, &req.document_ref).await?;

    let mut template = Template::new(Uuid::new_v4().to_string(), req.name, req.document_ref);
    template.description = req.description;
    state
        .repo
        .create_template(&req.scope_id, template.clone())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TemplateResponse {
            template,
            pages: geometry.pages,
        }),
    ))
}

/// Get a template with its document geometry
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let template = state.repo.fetch(&id).await?;
    let geometry = document_geometry(&state, &template.document_ref).await?;
    Ok(Json(TemplateResponse {
        template,
        pages: geometry.pages,
    }))
}

/// Replace a template's variables in one write.
///
/// The list goes through the variable store first, so duplicate ids, bad
/// pages, empty bindings and disallowed typography are refused and off-page
/// rects are clamped.
pub async fn save_variables(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SaveVariablesRequest>,
) -> Result<Json<SaveVariablesResponse>, ApiError> {
    let loaded = state.repo.load_template(&id).await?;
    let geometry = document_geometry(&state, &loaded.document_ref).await?;

    let submitted = req.variables;
    let store = VariableStore::from_variables(geometry, state.config.clone(), submitted.clone())?;
    let adjusted = submitted
        .iter()
        .zip(store.variables())
        .filter(|(before, after)| before != after)
        .map(|(_, after)| after.id.clone())
        .collect();

    state
        .repo
        .save_template_variables(&id, store.variables())
        .await?;

    Ok(Json(SaveVariablesResponse {
        saved: store.len(),
        adjusted,
    }))
}

/// Delete a template
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repo.delete_template(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve every variable of a template against the given contexts
pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let editor =
        TemplateEditor::open(&state.repo, &state.pages, &id, state.config.clone()).await?;
    Ok(Json(PreviewResponse {
        variables: editor.preview(&state.catalog, &req.contexts),
    }))
}

/// Resolve the tags of a free text
pub async fn resolve_text(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> Json<ResolveResponse> {
    let resolver = TagResolver::new(&state.catalog, &state.config);
    Json(ResolveResponse {
        text: resolver.resolve(&req.text, &req.contexts),
    })
}

/// Data sources, their fields and the registered tags
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        sources: state.catalog.sources().to_vec(),
        tags: state.catalog.mappings().to_vec(),
    })
}

async fn document_geometry(
    state: &AppState,
    document_ref: &str,
) -> Result<DocumentGeometry, ApiError> {
    let geometry = state
        .pages
        .load_document(document_ref)
        .await
        .map_err(|e| match e {
            PersistenceError::NotFound(doc) => {
                ApiError::InvalidRequest(format!("Unknown document: {}", doc))
            }
            other => other.into(),
        })?;

    if geometry.page_count() == 0 {
        return Err(ApiError::InvalidRequest(format!(
            "Document has no pages: {}",
            document_ref
        )));
    }
    Ok(geometry)
}
