//! Request and response bodies for the template API

use serde::{Deserialize, Serialize};
use shared_types::{DataSource, PageSize, TagMapping, Template, Variable, VariableId};
use template_engine::{ResolutionContexts, ResolvedVariable};

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub scope_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub document_ref: String,
}

/// A template with the geometry of its source document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: Template,
    pub pages: Vec<PageSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveVariablesRequest {
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveVariablesResponse {
    pub saved: usize,
    /// Variables whose rect was clamped back onto their page
    pub adjusted: Vec<VariableId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub contexts: ResolutionContexts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub variables: Vec<ResolvedVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub text: String,
    #[serde(default)]
    pub contexts: ResolutionContexts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub sources: Vec<DataSource>,
    pub tags: Vec<TagMapping>,
}
