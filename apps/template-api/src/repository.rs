//! SQLite-backed template repository
//!
//! The variable list lives in one JSON column, so saving a template is a
//! single UPDATE.

use async_trait::async_trait;
use chrono::Utc;
use shared_types::{Template, TemplateSummary, Variable};
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use template_engine::{LoadedTemplate, PersistenceError, TemplateRepository};

#[derive(Debug, Clone, FromRow)]
struct DbTemplate {
    id: String,
    name: String,
    description: String,
    document_ref: String,
    variables_json: String,
}

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                id TEXT PRIMARY KEY,
                scope_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                document_ref TEXT NOT NULL,
                variables_json TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_templates_scope ON templates(scope_id)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// The full stored template, variables included
    pub async fn fetch(&self, id: &str) -> Result<Template, PersistenceError> {
        let row: Option<DbTemplate> = sqlx::query_as(
            r#"
            SELECT id, name, description, document_ref, variables_json
            FROM templates
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let row = row.ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        let variables = parse_variables(&row.id, &row.variables_json)?;
        Ok(Template {
            id: row.id,
            name: row.name,
            description: row.description,
            document_ref: row.document_ref,
            variables,
        })
    }
}

fn storage_error(e: sqlx::Error) -> PersistenceError {
    tracing::error!("Template storage error: {}", e);
    PersistenceError::Transient(e.to_string())
}

fn parse_variables(id: &str, json: &str) -> Result<Vec<Variable>, PersistenceError> {
    serde_json::from_str(json).map_err(|e| {
        tracing::error!(template_id = id, "Stored variables are unreadable: {}", e);
        PersistenceError::Transient(format!("unreadable variables for template {}", id))
    })
}

#[async_trait]
impl TemplateRepository for SqliteRepository {
    async fn load_template(&self, id: &str) -> Result<LoadedTemplate, PersistenceError> {
        let template = self.fetch(id).await?;
        Ok(LoadedTemplate {
            document_ref: template.document_ref,
            variables: template.variables,
        })
    }

    async fn save_template_variables(
        &self,
        id: &str,
        variables: &[Variable],
    ) -> Result<(), PersistenceError> {
        let variables_json = serde_json::to_string(variables)
            .map_err(|e| PersistenceError::Transient(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE templates SET variables_json = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&variables_json)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }

        tracing::info!(template_id = id, variables = variables.len(), "Saved variables");
        Ok(())
    }

    async fn list_templates(&self, scope_id: &str) -> Result<Vec<TemplateSummary>, PersistenceError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT id, name FROM templates
            WHERE scope_id = ?
            ORDER BY name, id
            "#,
        )
        .bind(scope_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| TemplateSummary { id, name })
            .collect())
    }

    async fn delete_template(&self, id: &str) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        tracing::info!(template_id = id, "Deleted template");
        Ok(())
    }

    async fn create_template(&self, scope_id: &str, template: Template) -> Result<(), PersistenceError> {
        let variables_json = serde_json::to_string(&template.variables)
            .map_err(|e| PersistenceError::Transient(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO templates (id, scope_id, name, description, document_ref, variables_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template.id)
        .bind(scope_id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.document_ref)
        .bind(&variables_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        tracing::info!(template_id = %template.id, scope_id, "Created template");
        Ok(())
    }
}
