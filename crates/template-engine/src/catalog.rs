//! Field catalog: data sources, their fields and the tags that stand for them
//!
//! A catalog is built for one calling context (tenant, workspace) and then
//! only read. When a tag string is registered more than once, the last
//! registration wins for tag -> field lookup. A field's own tag is the first
//! one registered for it that still resolves back to it.

use crate::error::{EngineError, Result};
use shared_types::{ComputedValue, DataSource, Field, FieldType, TagMapping};
use std::collections::HashMap;

pub const MISSION_SOURCE: &str = "mission";
pub const USER_SOURCE: &str = "user";
pub const COMPANY_SOURCE: &str = "company";

#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    sources: Vec<DataSource>,
    mappings: Vec<TagMapping>,
    by_tag: HashMap<String, usize>,
    by_field: HashMap<(String, String), usize>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data source. Ids must be unique within the catalog.
    pub fn add_source(&mut self, source: DataSource) -> Result<()> {
        if self.source(&source.id).is_some() {
            return Err(EngineError::validation(format!(
                "data source '{}' is already registered",
                source.id
            )));
        }
        self.sources.push(source);
        Ok(())
    }

    /// Register a tag for an existing field
    pub fn register_tag(&mut self, mapping: TagMapping) -> Result<()> {
        if !is_well_formed_tag(&mapping.tag) {
            return Err(EngineError::validation(format!(
                "malformed tag '{}': expected <name>",
                mapping.tag
            )));
        }
        if self.field(&mapping.data_source_id, &mapping.field_id).is_none() {
            return Err(EngineError::validation(format!(
                "tag '{}' targets unknown field {}.{}",
                mapping.tag, mapping.data_source_id, mapping.field_id
            )));
        }

        let index = self.mappings.len();
        let field_key = (mapping.data_source_id.clone(), mapping.field_id.clone());
        let displaced = self.by_tag.insert(mapping.tag.clone(), index);
        self.by_field.entry(field_key.clone()).or_insert(index);
        self.mappings.push(mapping);

        if let Some(previous) = displaced {
            let prev = &self.mappings[previous];
            tracing::debug!(
                tag = %prev.tag,
                "tag re-registered ({}.{} -> {}.{}), last registration wins",
                prev.data_source_id,
                prev.field_id,
                field_key.0,
                field_key.1
            );
            let prev_key = (prev.data_source_id.clone(), prev.field_id.clone());
            if self.by_field.get(&prev_key) == Some(&previous) {
                self.relink_field(prev_key);
            }
        }
        Ok(())
    }

    /// Point a field's forward entry at its earliest tag that still
    /// resolves to it, or drop the entry when none does.
    fn relink_field(&mut self, key: (String, String)) {
        let live = self.mappings.iter().enumerate().find_map(|(i, m)| {
            let same_field = m.data_source_id == key.0 && m.field_id == key.1;
            (same_field && self.by_tag.get(&m.tag) == Some(&i)).then_some(i)
        });
        match live {
            Some(i) => {
                self.by_field.insert(key, i);
            }
            None => {
                self.by_field.remove(&key);
            }
        }
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn source(&self, data_source_id: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.id == data_source_id)
    }

    /// Fields of a source in declaration order; empty for an unknown source
    pub fn fields_for(&self, data_source_id: &str) -> &[Field] {
        self.source(data_source_id)
            .map(|s| s.fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn field(&self, data_source_id: &str, field_id: &str) -> Option<&Field> {
        self.source(data_source_id)?.field(field_id)
    }

    pub fn tag_for(&self, data_source_id: &str, field_id: &str) -> Option<&str> {
        self.by_field
            .get(&(data_source_id.to_string(), field_id.to_string()))
            .map(|&i| self.mappings[i].tag.as_str())
    }

    /// Field a tag stands for, as `(data_source_id, field_id)`
    pub fn resolve_tag(&self, tag: &str) -> Option<(&str, &str)> {
        self.by_tag.get(tag).map(|&i| {
            let m = &self.mappings[i];
            (m.data_source_id.as_str(), m.field_id.as_str())
        })
    }

    /// Every registration, in order, duplicates included
    pub fn mappings(&self) -> &[TagMapping] {
        &self.mappings
    }

    /// Catalog with the mission, user and company sources and their tags.
    /// Built fresh on every call.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for source in standard_sources() {
            catalog.sources.push(source);
        }
        for (tag, source, field, example) in STANDARD_TAGS {
            let mapping = TagMapping {
                tag: tag.to_string(),
                data_source_id: source.to_string(),
                field_id: field.to_string(),
                example: example.to_string(),
            };
            if let Err(e) = catalog.register_tag(mapping) {
                tracing::error!("standard tag table is inconsistent: {}", e);
            }
        }
        catalog
    }
}

/// `<name>` with a non-empty name and no nested brackets
pub fn is_well_formed_tag(tag: &str) -> bool {
    let Some(inner) = tag.strip_prefix('<').and_then(|t| t.strip_suffix('>')) else {
        return false;
    };
    !inner.is_empty() && !inner.contains(['<', '>'])
}

fn standard_sources() -> Vec<DataSource> {
    let mut mission = DataSource::new(MISSION_SOURCE, "Mission");
    mission.fields = vec![
        Field::new("numeroMission", "Numéro de mission", FieldType::Text),
        Field::new("objet", "Objet", FieldType::Text),
        Field::new("lieu", "Lieu", FieldType::Text),
        Field::new("dateDebut", "Date de début", FieldType::Date),
        Field::new("dateFin", "Date de fin", FieldType::Date),
        Field::new("montant", "Montant", FieldType::Number),
        Field::new("participants", "Participants", FieldType::List),
        Field::new("urgent", "Urgente", FieldType::Boolean),
        Field::new("dateGeneration", "Date de génération", FieldType::Date)
            .with_description("Date at which the document is generated")
            .computed(ComputedValue::GenerationDate),
    ];

    let mut user = DataSource::new(USER_SOURCE, "Utilisateur");
    user.fields = vec![
        Field::new("nom", "Nom", FieldType::Text),
        Field::new("prenom", "Prénom", FieldType::Text),
        Field::new("email", "Email", FieldType::Text),
        Field::new("telephone", "Téléphone", FieldType::Text),
        Field::new("poste", "Poste", FieldType::Text),
    ];

    let mut company = DataSource::new(COMPANY_SOURCE, "Entreprise");
    company.fields = vec![
        Field::new("raisonSociale", "Raison sociale", FieldType::Text),
        Field::new("adresse", "Adresse", FieldType::Text),
        Field::new("siret", "SIRET", FieldType::Text),
        Field::new("telephoneEntreprise", "Téléphone", FieldType::Text),
        Field::new("emailEntreprise", "Email", FieldType::Text),
    ];

    vec![mission, user, company]
}

/// (tag, source, field, example). Order matters: later duplicates win.
const STANDARD_TAGS: &[(&str, &str, &str, &str)] = &[
    ("<mission_numero>", MISSION_SOURCE, "numeroMission", "M2024-001"),
    ("<mission_objet>", MISSION_SOURCE, "objet", "Audit annuel"),
    ("<mission_lieu>", MISSION_SOURCE, "lieu", "Lyon"),
    ("<mission_date_debut>", MISSION_SOURCE, "dateDebut", "01/03/2024"),
    ("<mission_date_fin>", MISSION_SOURCE, "dateFin", "05/03/2024"),
    ("<mission_montant>", MISSION_SOURCE, "montant", "1500"),
    ("<mission_participants>", MISSION_SOURCE, "participants", "A. Martin, B. Durand"),
    ("<mission_urgente>", MISSION_SOURCE, "urgent", "non"),
    ("<mission_date_generation>", MISSION_SOURCE, "dateGeneration", "18/10/2026"),
    ("<date>", MISSION_SOURCE, "dateDebut", "01/03/2024"),
    ("<date>", MISSION_SOURCE, "dateGeneration", "18/10/2026"),
    ("<user_nom>", USER_SOURCE, "nom", "Martin"),
    ("<user_prenom>", USER_SOURCE, "prenom", "Alice"),
    ("<user_email>", USER_SOURCE, "email", "alice.martin@example.com"),
    ("<user_telephone>", USER_SOURCE, "telephone", "06 12 34 56 78"),
    ("<user_poste>", USER_SOURCE, "poste", "Consultante"),
    ("<entreprise_nom>", COMPANY_SOURCE, "raisonSociale", "Acme SAS"),
    ("<entreprise_adresse>", COMPANY_SOURCE, "adresse", "1 rue de la Paix, Paris"),
    ("<entreprise_siret>", COMPANY_SOURCE, "siret", "123 456 789 00012"),
    ("<entreprise_telephone>", COMPANY_SOURCE, "telephoneEntreprise", "01 23 45 67 89"),
    ("<entreprise_email>", COMPANY_SOURCE, "emailEntreprise", "contact@acme.example"),
    ("<entreprise_nom>", COMPANY_SOURCE, "raisonSociale", "Acme SAS"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(tag: &str, source: &str, field: &str) -> TagMapping {
        TagMapping {
            tag: tag.to_string(),
            data_source_id: source.to_string(),
            field_id: field.to_string(),
            example: String::new(),
        }
    }

    fn small_catalog() -> FieldCatalog {
        let mut catalog = FieldCatalog::new();
        let mut source = DataSource::new("mission", "Mission");
        source.fields = vec![
            Field::new("numeroMission", "Numéro", FieldType::Text),
            Field::new("lieu", "Lieu", FieldType::Text),
        ];
        catalog.add_source(source).unwrap();
        catalog
    }

    #[test]
    fn test_fields_for_preserves_order() {
        let catalog = small_catalog();
        let ids: Vec<&str> = catalog
            .fields_for("mission")
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["numeroMission", "lieu"]);
        assert!(catalog.fields_for("unknown").is_empty());
    }

    #[test]
    fn test_forward_and_inverse_lookup() {
        let mut catalog = small_catalog();
        catalog
            .register_tag(mapping("<mission_numero>", "mission", "numeroMission"))
            .unwrap();

        assert_eq!(
            catalog.tag_for("mission", "numeroMission"),
            Some("<mission_numero>")
        );
        assert_eq!(
            catalog.resolve_tag("<mission_numero>"),
            Some(("mission", "numeroMission"))
        );
        assert_eq!(catalog.tag_for("mission", "lieu"), None);
        assert_eq!(catalog.resolve_tag("<nope>"), None);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut catalog = small_catalog();
        catalog
            .register_tag(mapping("<m>", "mission", "numeroMission"))
            .unwrap();
        catalog.register_tag(mapping("<m>", "mission", "lieu")).unwrap();

        assert_eq!(catalog.resolve_tag("<m>"), Some(("mission", "lieu")));
        assert_eq!(catalog.mappings().len(), 2);
    }

    #[test]
    fn test_repointed_tag_leaves_first_field() {
        let mut catalog = small_catalog();
        catalog
            .register_tag(mapping("<m>", "mission", "numeroMission"))
            .unwrap();
        catalog.register_tag(mapping("<m>", "mission", "lieu")).unwrap();

        assert_eq!(catalog.tag_for("mission", "numeroMission"), None);
        assert_eq!(catalog.tag_for("mission", "lieu"), Some("<m>"));
    }

    #[test]
    fn test_field_falls_back_to_its_other_tag() {
        let mut catalog = small_catalog();
        catalog
            .register_tag(mapping("<shared>", "mission", "numeroMission"))
            .unwrap();
        catalog
            .register_tag(mapping("<numero>", "mission", "numeroMission"))
            .unwrap();
        catalog
            .register_tag(mapping("<shared>", "mission", "lieu"))
            .unwrap();

        assert_eq!(
            catalog.tag_for("mission", "numeroMission"),
            Some("<numero>")
        );
        assert_eq!(catalog.tag_for("mission", "lieu"), Some("<shared>"));
    }

    #[test]
    fn test_standard_tags_resolve_back_to_their_field() {
        let catalog = FieldCatalog::standard();
        let mut tagged = 0;
        for source in catalog.sources() {
            for field in &source.fields {
                if let Some(tag) = catalog.tag_for(&source.id, &field.id) {
                    assert_eq!(
                        catalog.resolve_tag(tag),
                        Some((source.id.as_str(), field.id.as_str())),
                        "{} for {}.{}",
                        tag,
                        source.id,
                        field.id
                    );
                    tagged += 1;
                }
            }
        }
        assert_eq!(tagged, 19);
        assert_eq!(
            catalog.tag_for(MISSION_SOURCE, "dateDebut"),
            Some("<mission_date_debut>")
        );
    }

    #[test]
    fn test_register_rejects_malformed_or_dangling_tags() {
        let mut catalog = small_catalog();
        assert!(catalog
            .register_tag(mapping("mission_numero", "mission", "numeroMission"))
            .is_err());
        assert!(catalog
            .register_tag(mapping("<>", "mission", "numeroMission"))
            .is_err());
        assert!(catalog
            .register_tag(mapping("<a<b>", "mission", "numeroMission"))
            .is_err());
        assert!(catalog
            .register_tag(mapping("<x>", "mission", "missing"))
            .is_err());
        assert!(catalog.mappings().is_empty());
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut catalog = small_catalog();
        assert!(catalog
            .add_source(DataSource::new("mission", "Again"))
            .is_err());
    }

    #[test]
    fn test_standard_catalog() {
        let catalog = FieldCatalog::standard();
        assert_eq!(catalog.sources().len(), 3);
        assert_eq!(catalog.mappings().len(), STANDARD_TAGS.len());
        assert_eq!(
            catalog.resolve_tag("<mission_numero>"),
            Some((MISSION_SOURCE, "numeroMission"))
        );
        assert_eq!(
            catalog.resolve_tag("<date>"),
            Some((MISSION_SOURCE, "dateGeneration"))
        );
        let generation = catalog.field(MISSION_SOURCE, "dateGeneration").unwrap();
        assert_eq!(generation.computed, Some(ComputedValue::GenerationDate));
    }

    #[test]
    fn test_standard_catalogs_are_independent() {
        let mut a = FieldCatalog::standard();
        let b = FieldCatalog::standard();
        a.register_tag(mapping("<mission_numero>", MISSION_SOURCE, "lieu"))
            .unwrap();
        assert_eq!(
            b.resolve_tag("<mission_numero>"),
            Some((MISSION_SOURCE, "numeroMission"))
        );
    }
}
