//! Tag resolution against record contexts
//!
//! `resolve` scans the text once, left to right. Every `<tag>` the catalog
//! knows is replaced by its value; anything else, including malformed
//! tag-like text, is copied through verbatim. Substituted values are never
//! scanned again.
//!
//! A tag's value is, in order:
//! 1. the computed value, for fields with no backing record (generation date)
//! 2. the first of the mission, user and company contexts defining the
//!    field's key
//! 3. the empty string

use crate::catalog::FieldCatalog;
use crate::config::EngineConfig;
use crate::persistence::RecordContextProvider;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared_types::{ComputedValue, RecordContext};
use std::fmt::Write;

const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// The record contexts a resolution may draw on, in priority order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionContexts {
    pub mission: RecordContext,
    pub user: RecordContext,
    pub company: RecordContext,
}

impl ResolutionContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the active contexts of a provider
    pub fn from_provider(provider: &dyn RecordContextProvider) -> Self {
        Self {
            mission: provider.mission_context(),
            user: provider.user_context(),
            company: provider.company_context(),
        }
    }

    pub fn with_mission(mut self, mission: RecordContext) -> Self {
        self.mission = mission;
        self
    }

    pub fn with_user(mut self, user: RecordContext) -> Self {
        self.user = user;
        self
    }

    pub fn with_company(mut self, company: RecordContext) -> Self {
        self.company = company;
        self
    }

    /// First context defining `key`: mission, then user, then company
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.mission
            .get(key)
            .or_else(|| self.user.get(key))
            .or_else(|| self.company.get(key))
    }
}

pub struct TagResolver<'a> {
    catalog: &'a FieldCatalog,
    date_format: &'a str,
}

impl<'a> TagResolver<'a> {
    pub fn new(catalog: &'a FieldCatalog, config: &'a EngineConfig) -> Self {
        Self {
            catalog,
            date_format: &config.date_format,
        }
    }

    /// Resolve all known tags in `text`, dating computed fields today
    pub fn resolve(&self, text: &str, contexts: &ResolutionContexts) -> String {
        self.resolve_on(text, contexts, Local::now().date_naive())
    }

    /// Resolve all known tags in `text` as of `today`
    pub fn resolve_on(&self, text: &str, contexts: &ResolutionContexts, today: NaiveDate) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find('<') {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];

            // A tag closes at the first '>' with no '<' in between
            if let Some(end) = candidate[1..].find(['<', '>']) {
                let close = end + 1;
                if candidate.as_bytes()[close] == b'>' {
                    let tag = &candidate[..=close];
                    if let Some((source, field)) = self.catalog.resolve_tag(tag) {
                        out.push_str(&self.field_value(source, field, contexts, today));
                        rest = &candidate[close + 1..];
                        continue;
                    }
                }
            }

            out.push('<');
            rest = &candidate[1..];
        }

        out.push_str(rest);
        out
    }

    /// Display value of one catalog field
    pub fn field_value(
        &self,
        data_source_id: &str,
        field_id: &str,
        contexts: &ResolutionContexts,
        today: NaiveDate,
    ) -> String {
        let Some(field) = self.catalog.field(data_source_id, field_id) else {
            tracing::warn!(
                "field {}.{} is not in the catalog, substituting empty text",
                data_source_id,
                field_id
            );
            return String::new();
        };

        if let Some(computed) = field.computed {
            return self.computed_value(computed, today);
        }

        match contexts.lookup(&field.id) {
            Some(value) => value.to_string(),
            None => {
                tracing::debug!(
                    "no context defines {}.{}, substituting empty text",
                    data_source_id,
                    field_id
                );
                String::new()
            }
        }
    }

    fn computed_value(&self, computed: ComputedValue, today: NaiveDate) -> String {
        match computed {
            ComputedValue::GenerationDate => format_date(today, self.date_format),
        }
    }
}

/// Format a date, falling back to dd/mm/yyyy when `format` is invalid
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        tracing::warn!("invalid date format '{}', using {}", format, FALLBACK_DATE_FORMAT);
        out.clear();
        let _ = write!(out, "{}", date.format(FALLBACK_DATE_FORMAT));
    }
    out
}

/// Resolve `text` with default settings
pub fn resolve(text: &str, contexts: &ResolutionContexts, catalog: &FieldCatalog) -> String {
    let config = EngineConfig::default();
    TagResolver::new(catalog, &config).resolve(text, contexts)
}
