//! Adapters the engine consumes but does not implement
//!
//! Storage and page sources are async; everything else in the engine is
//! synchronous and only reaches these traits on load and explicit save.
//! In-memory implementations are provided for tests and embedding hosts.

use crate::error::PersistenceError;
use async_trait::async_trait;
use shared_types::{DocumentGeometry, RecordContext, Template, TemplateSummary, Variable};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// What `load_template` returns: the document reference plus variables
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTemplate {
    pub document_ref: String,
    pub variables: Vec<Variable>,
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn load_template(&self, id: &str) -> Result<LoadedTemplate, PersistenceError>;

    /// Replace the full variable list in one write
    async fn save_template_variables(
        &self,
        id: &str,
        variables: &[Variable],
    ) -> Result<(), PersistenceError>;

    async fn list_templates(&self, scope_id: &str) -> Result<Vec<TemplateSummary>, PersistenceError>;

    async fn delete_template(&self, id: &str) -> Result<(), PersistenceError>;

    /// Register an empty template for a source document
    async fn create_template(&self, scope_id: &str, template: Template) -> Result<(), PersistenceError>;
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load_document(&self, document_ref: &str) -> Result<DocumentGeometry, PersistenceError>;
}

/// Supplies the active records tags are resolved against
pub trait RecordContextProvider {
    fn mission_context(&self) -> RecordContext;
    fn user_context(&self) -> RecordContext;
    fn company_context(&self) -> RecordContext;
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    scope_id: String,
    template: Template,
}

/// Templates held in memory, keyed by id
#[derive(Debug, Default)]
pub struct MemoryRepository {
    templates: RwLock<BTreeMap<String, StoredTemplate>>,
    read_only: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository that refuses every write with `PermissionDenied`
    pub fn read_only(templates: impl IntoIterator<Item = (String, Template)>) -> Self {
        let repo = Self {
            templates: RwLock::default(),
            read_only: true,
        };
        if let Ok(mut map) = repo.templates.write() {
            for (scope_id, template) in templates {
                map.insert(template.id.clone(), StoredTemplate { scope_id, template });
            }
        }
        repo
    }

    /// Current stored copy of a template
    pub fn get(&self, id: &str) -> Option<Template> {
        self.templates
            .read()
            .ok()
            .and_then(|map| map.get(id).map(|s| s.template.clone()))
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.read_only {
            Err(PersistenceError::PermissionDenied)
        } else {
            Ok(())
        }
    }
}

fn poisoned<T>(_: T) -> PersistenceError {
    PersistenceError::Transient("template store lock poisoned".to_string())
}

#[async_trait]
impl TemplateRepository for MemoryRepository {
    async fn load_template(&self, id: &str) -> Result<LoadedTemplate, PersistenceError> {
        let map = self.templates.read().map_err(poisoned)?;
        let stored = map
            .get(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        Ok(LoadedTemplate {
            document_ref: stored.template.document_ref.clone(),
            variables: stored.template.variables.clone(),
        })
    }

    async fn save_template_variables(
        &self,
        id: &str,
        variables: &[Variable],
    ) -> Result<(), PersistenceError> {
        self.check_writable()?;
        let mut map = self.templates.write().map_err(poisoned)?;
        let stored = map
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        stored.template.variables = variables.to_vec();
        Ok(())
    }

    async fn list_templates(&self, scope_id: &str) -> Result<Vec<TemplateSummary>, PersistenceError> {
        let map = self.templates.read().map_err(poisoned)?;
        Ok(map
            .values()
            .filter(|s| s.scope_id == scope_id)
            .map(|s| TemplateSummary {
                id: s.template.id.clone(),
                name: s.template.name.clone(),
            })
            .collect())
    }

    async fn delete_template(&self, id: &str) -> Result<(), PersistenceError> {
        self.check_writable()?;
        let mut map = self.templates.write().map_err(poisoned)?;
        map.remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn create_template(&self, scope_id: &str, template: Template) -> Result<(), PersistenceError> {
        self.check_writable()?;
        let mut map = self.templates.write().map_err(poisoned)?;
        map.insert(
            template.id.clone(),
            StoredTemplate {
                scope_id: scope_id.to_string(),
                template,
            },
        );
        Ok(())
    }
}

/// Page geometry for a fixed set of documents
#[derive(Debug, Clone, Default)]
pub struct StaticPageSource {
    documents: HashMap<String, DocumentGeometry>,
}

impl StaticPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document_ref: impl Into<String>, geometry: DocumentGeometry) -> Self {
        self.documents.insert(document_ref.into(), geometry);
        self
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn load_document(&self, document_ref: &str) -> Result<DocumentGeometry, PersistenceError> {
        self.documents
            .get(document_ref)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound(document_ref.to_string()))
    }
}

/// Fixed contexts, handy for previews and tests
#[derive(Debug, Clone, Default)]
pub struct StaticContextProvider {
    pub mission: RecordContext,
    pub user: RecordContext,
    pub company: RecordContext,
}

impl RecordContextProvider for StaticContextProvider {
    fn mission_context(&self) -> RecordContext {
        self.mission.clone()
    }

    fn user_context(&self) -> RecordContext {
        self.user.clone()
    }

    fn company_context(&self) -> RecordContext {
        self.company.clone()
    }
}
