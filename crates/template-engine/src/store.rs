//! Variable store: the authoritative list of placed variables for one template
//!
//! Every mutation is validated and clamped before it is committed, so a
//! failed call leaves the list exactly as it was. List order is paint
//! order: later entries draw on top.

use crate::config::{is_allowed_font_size, is_allowed_line_height, EngineConfig};
use crate::error::{EngineError, Result};
use crate::geometry::{clamp, resize_from_corner, ClampMode, Corner, Point, Rect};
use shared_types::{
    DocumentGeometry, PageSize, Position, TextAlign, Variable, VariableContent, VariableId,
    VerticalAlign,
};
use std::collections::HashSet;
use uuid::Uuid;

/// A single validated edit to a variable's properties
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    FontFamily(String),
    FontSize(f32),
    Bold(bool),
    LineHeight(f32),
    TextAlign(TextAlign),
    VerticalAlign(VerticalAlign),
    /// Literal text, raw-text variables only
    Text(String),
    /// Bound field, bound-field variables only
    Binding {
        data_source_id: String,
        field_id: String,
    },
    /// Move to another page of the document, keeping the rect on it
    Page(u32),
}

impl Property {
    /// Parse a property from its serialized name and a string value
    pub fn parse(name: &str, value: &str) -> Result<Self> {
        let invalid = |what: &str| {
            EngineError::validation(format!("invalid {} value '{}'", what, value))
        };
        match name {
            "fontFamily" => Ok(Property::FontFamily(value.to_string())),
            "fontSizePt" => value
                .parse()
                .map(Property::FontSize)
                .map_err(|_| invalid(name)),
            "bold" => value.parse().map(Property::Bold).map_err(|_| invalid(name)),
            "lineHeight" => value
                .parse()
                .map(Property::LineHeight)
                .map_err(|_| invalid(name)),
            "textAlign" => value
                .parse()
                .map(Property::TextAlign)
                .map_err(EngineError::Validation),
            "verticalAlign" => value
                .parse()
                .map(Property::VerticalAlign)
                .map_err(EngineError::Validation),
            "text" => Ok(Property::Text(value.to_string())),
            "binding" => {
                let (source, field) = value.split_once('.').ok_or_else(|| invalid(name))?;
                Ok(Property::Binding {
                    data_source_id: source.to_string(),
                    field_id: field.to_string(),
                })
            }
            "page" => value.parse().map(Property::Page).map_err(|_| invalid(name)),
            other => Err(EngineError::validation(format!("unknown property '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableStore {
    geometry: DocumentGeometry,
    config: EngineConfig,
    variables: Vec<Variable>,
    dirty: bool,
}

impl VariableStore {
    /// Empty store for a document
    pub fn new(geometry: DocumentGeometry, config: EngineConfig) -> Self {
        Self {
            geometry,
            config,
            variables: Vec::new(),
            dirty: false,
        }
    }

    /// Store seeded with persisted variables.
    ///
    /// Duplicate ids, pages outside the document, empty bindings and
    /// typography outside the allowed values are rejected. Rects that no
    /// longer fit their page are clamped, which leaves the store dirty.
    pub fn from_variables(
        geometry: DocumentGeometry,
        config: EngineConfig,
        variables: Vec<Variable>,
    ) -> Result<Self> {
        let mut store = Self::new(geometry, config);
        let mut seen = HashSet::new();

        for mut variable in variables {
            if !seen.insert(variable.id.clone()) {
                return Err(EngineError::validation(format!(
                    "duplicate variable id '{}'",
                    variable.id
                )));
            }
            validate_content(&variable.content)?;
            validate_typography(&variable)?;
            let bounds = store.page_bounds(variable.position.page)?;

            let rect = Rect::of(&variable);
            if !rect.fits(bounds, store.config.min_size) {
                let fitted = clamp(rect, bounds, store.config.min_size, ClampMode::Resize);
                tracing::warn!(
                    variable_id = %variable.id,
                    "stored rect {:?} does not fit page {}, clamped to {:?}",
                    rect,
                    variable.position.page,
                    fitted
                );
                apply_rect(&mut variable, fitted);
                store.dirty = true;
            }
            store.variables.push(variable);
        }

        Ok(store)
    }

    pub fn geometry(&self) -> &DocumentGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn page_bounds(&self, page: u32) -> Result<PageSize> {
        self.geometry.page(page).ok_or_else(|| {
            EngineError::validation(format!(
                "page {} is outside the document (1..={})",
                page,
                self.geometry.page_count()
            ))
        })
    }

    /// Append a variable for the armed content, its origin at `point`
    pub fn place(
        &mut self,
        armed: Option<VariableContent>,
        point: Point,
        page: u32,
    ) -> Result<VariableId> {
        let content =
            armed.ok_or_else(|| EngineError::validation("nothing is armed for placement"))?;
        validate_content(&content)?;
        let bounds = self.page_bounds(page)?;

        let size = self.config.default_size;
        let rect = clamp(
            Rect::new(point.x, point.y, size.width, size.height),
            bounds,
            self.config.min_size,
            ClampMode::Move,
        );

        let mut typography = self.config.default_typography.clone();
        if matches!(content, VariableContent::RawText { .. }) {
            typography.line_height = Some(self.config.default_line_height);
        }

        let id = self.fresh_id();
        let variable = Variable {
            id: id.clone(),
            content,
            position: Position {
                x: rect.x,
                y: rect.y,
                page,
            },
            size: rect.size(),
            typography,
            text_align: self.config.default_text_align,
            vertical_align: self.config.default_vertical_align,
        };

        tracing::info!(variable_id = %id, page, "placed variable at ({}, {})", rect.x, rect.y);
        self.variables.push(variable);
        self.dirty = true;
        Ok(id)
    }

    /// Move a variable's origin, keeping its size
    pub fn move_to(&mut self, id: &VariableId, origin: Point) -> Result<()> {
        let index = self.index_of(id)?;
        let variable = &self.variables[index];
        let bounds = self.page_bounds(variable.position.page)?;

        let current = Rect::of(variable);
        let rect = clamp(
            Rect::new(origin.x, origin.y, current.width, current.height),
            bounds,
            self.config.min_size,
            ClampMode::Move,
        );

        tracing::debug!(variable_id = %id, "move to ({}, {})", rect.x, rect.y);
        apply_rect(&mut self.variables[index], rect);
        self.dirty = true;
        Ok(())
    }

    /// Resize by dragging `corner` to where it sits in `proposed`; the
    /// opposite corner stays fixed.
    pub fn resize(&mut self, id: &VariableId, corner: Corner, proposed: Rect) -> Result<()> {
        let index = self.index_of(id)?;
        let variable = &self.variables[index];
        let bounds = self.page_bounds(variable.position.page)?;

        let rect = resize_from_corner(
            Rect::of(variable),
            corner,
            proposed,
            bounds,
            self.config.min_size,
        );

        tracing::debug!(variable_id = %id, ?corner, "resize to {:?}", rect);
        apply_rect(&mut self.variables[index], rect);
        self.dirty = true;
        Ok(())
    }

    pub fn set_property(&mut self, id: &VariableId, property: Property) -> Result<()> {
        let index = self.index_of(id)?;
        let mut updated = self.variables[index].clone();

        match property {
            Property::FontFamily(family) => {
                let family = family.trim();
                if family.is_empty() {
                    return Err(EngineError::validation("font family must not be empty"));
                }
                updated.typography.font_family = family.to_string();
            }
            Property::FontSize(size) => {
                if !is_allowed_font_size(size) {
                    return Err(EngineError::validation(format!(
                        "font size {}pt is not an allowed size",
                        size
                    )));
                }
                updated.typography.font_size_pt = size;
            }
            Property::Bold(bold) => updated.typography.bold = bold,
            Property::LineHeight(line_height) => {
                if matches!(updated.content, VariableContent::BoundField { .. }) {
                    return Err(EngineError::validation(
                        "line height can only be set on raw-text variables",
                    ));
                }
                if !is_allowed_line_height(line_height) {
                    return Err(EngineError::validation(format!(
                        "line height {} is outside 0.5..=3.0",
                        line_height
                    )));
                }
                updated.typography.line_height = Some(line_height);
            }
            Property::TextAlign(align) => updated.text_align = align,
            Property::VerticalAlign(align) => updated.vertical_align = align,
            Property::Text(text) => match &mut updated.content {
                VariableContent::RawText { text: current } => *current = text,
                VariableContent::BoundField { .. } => {
                    return Err(EngineError::validation(
                        "text can only be set on raw-text variables",
                    ))
                }
            },
            Property::Binding {
                data_source_id,
                field_id,
            } => {
                if !matches!(updated.content, VariableContent::BoundField { .. }) {
                    return Err(EngineError::validation(
                        "binding can only be set on bound-field variables",
                    ));
                }
                let content = VariableContent::bound(data_source_id, field_id);
                validate_content(&content)?;
                updated.content = content;
            }
            Property::Page(page) => {
                let bounds = self.page_bounds(page)?;
                let rect = clamp(
                    Rect::of(&updated),
                    bounds,
                    self.config.min_size,
                    ClampMode::Move,
                );
                apply_rect(&mut updated, rect);
                updated.position.page = page;
            }
        }

        self.variables[index] = updated;
        self.dirty = true;
        Ok(())
    }

    /// Delete a variable; the order of the rest is preserved
    pub fn remove(&mut self, id: &VariableId) -> Result<Variable> {
        let index = self.index_of(id)?;
        let removed = self.variables.remove(index);
        tracing::info!(variable_id = %id, "removed variable");
        self.dirty = true;
        Ok(removed)
    }

    /// Variables in paint order, optionally only those on `page`
    pub fn list(&self, page: Option<u32>) -> Vec<&Variable> {
        self.variables
            .iter()
            .filter(|v| page.map_or(true, |p| v.position.page == p))
            .collect()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn get(&self, id: &VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| &v.id == id)
    }

    pub fn contains(&self, id: &VariableId) -> bool {
        self.get(id).is_some()
    }

    /// Topmost variable on `page` containing `point`
    pub fn hit_test(&self, page: u32, point: Point) -> Option<&Variable> {
        self.variables
            .iter()
            .rev()
            .find(|v| v.position.page == page && Rect::of(v).contains(point))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// True when the list changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn index_of(&self, id: &VariableId) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| EngineError::NotFound(id.clone()))
    }

    fn fresh_id(&self) -> VariableId {
        loop {
            let id = VariableId(Uuid::new_v4().to_string());
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

fn apply_rect(variable: &mut Variable, rect: Rect) {
    variable.position.x = rect.x;
    variable.position.y = rect.y;
    variable.size = rect.size();
}

fn validate_content(content: &VariableContent) -> Result<()> {
    if let VariableContent::BoundField {
        data_source_id,
        field_id,
    } = content
    {
        if data_source_id.is_empty() || field_id.is_empty() {
            return Err(EngineError::validation(
                "bound field needs a data source and a field id",
            ));
        }
    }
    Ok(())
}

fn validate_typography(variable: &Variable) -> Result<()> {
    let typography = &variable.typography;
    if typography.font_family.trim().is_empty() {
        return Err(EngineError::validation(format!(
            "variable '{}' has an empty font family",
            variable.id
        )));
    }
    if !is_allowed_font_size(typography.font_size_pt) {
        return Err(EngineError::validation(format!(
            "variable '{}' uses font size {}pt, which is not an allowed size",
            variable.id, typography.font_size_pt
        )));
    }
    match (&variable.content, typography.line_height) {
        (VariableContent::BoundField { .. }, Some(_)) => Err(EngineError::validation(format!(
            "bound-field variable '{}' must not carry a line height",
            variable.id
        ))),
        (_, Some(line_height)) if !is_allowed_line_height(line_height) => {
            Err(EngineError::validation(format!(
                "variable '{}' has line height {} outside 0.5..=3.0",
                variable.id, line_height
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::Size;

    fn a4_store(pages: u32) -> VariableStore {
        VariableStore::new(
            DocumentGeometry::uniform(pages, PageSize::a4()),
            EngineConfig::default(),
        )
    }

    fn bound() -> Option<VariableContent> {
        Some(VariableContent::bound("mission", "numeroMission"))
    }

    #[test]
    fn test_place_uses_defaults() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(120.0, 80.0), 1).unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!(var.position, Position { x: 120.0, y: 80.0, page: 1 });
        assert_eq!(var.size, Size::new(100.0, 30.0));
        assert_eq!(var.typography.font_family, "Arial");
        assert_eq!(var.typography.font_size_pt, 12.0);
        assert_eq!(var.typography.line_height, None);
        assert_eq!(var.text_align, TextAlign::Left);
        assert_eq!(var.vertical_align, VerticalAlign::Middle);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_place_raw_text_gets_line_height() {
        let mut store = a4_store(1);
        let id = store
            .place(Some(VariableContent::raw("Bonjour")), Point::new(0.0, 0.0), 1)
            .unwrap();
        assert_eq!(store.get(&id).unwrap().typography.line_height, Some(1.2));
    }

    #[test]
    fn test_place_without_armed_content_fails() {
        let mut store = a4_store(1);
        let err = store.place(None, Point::new(10.0, 10.0), 1).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_place_rejects_page_out_of_range() {
        let mut store = a4_store(2);
        assert!(store.place(bound(), Point::new(10.0, 10.0), 0).is_err());
        assert!(store.place(bound(), Point::new(10.0, 10.0), 3).is_err());
        assert!(store.place(bound(), Point::new(10.0, 10.0), 2).is_ok());
    }

    #[test]
    fn test_place_near_edge_is_clamped() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(590.0, 840.0), 1).unwrap();
        let var = store.get(&id).unwrap();
        assert_eq!((var.position.x, var.position.y), (495.0, 812.0));
    }

    #[test]
    fn test_place_generates_unique_ids() {
        let mut store = a4_store(1);
        let a = store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        let b = store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_move_keeps_size_and_clamps() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(10.0, 10.0), 1).unwrap();
        store.move_to(&id, Point::new(-50.0, 900.0)).unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!((var.position.x, var.position.y), (0.0, 812.0));
        assert_eq!(var.size, Size::new(100.0, 30.0));
    }

    #[test]
    fn test_move_unknown_id_is_not_found() {
        let mut store = a4_store(1);
        let err = store
            .move_to(&VariableId::new("ghost"), Point::new(0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, EngineError::NotFound(VariableId::new("ghost")));
    }

    #[test]
    fn test_resize_north_west_holds_south_east() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(100.0, 100.0), 1).unwrap();
        let start = Rect::of(store.get(&id).unwrap());

        let proposed = Corner::NorthWest.drag(&start, Point::new(-40.0, -20.0));
        store.resize(&id, Corner::NorthWest, proposed).unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!((var.position.x, var.position.y), (60.0, 80.0));
        assert_eq!(var.size, Size::new(140.0, 50.0));
    }

    #[test]
    fn test_resize_stops_at_min_size() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(100.0, 100.0), 1).unwrap();
        let start = Rect::of(store.get(&id).unwrap());

        let proposed = Corner::SouthEast.drag(&start, Point::new(-300.0, -300.0));
        store.resize(&id, Corner::SouthEast, proposed).unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!((var.position.x, var.position.y), (100.0, 100.0));
        assert_eq!(var.size, Size::new(20.0, 20.0));
    }

    #[test]
    fn test_set_property_validates() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(10.0, 10.0), 1).unwrap();

        assert!(store.set_property(&id, Property::FontSize(13.0)).is_err());
        assert!(store.set_property(&id, Property::LineHeight(3.5)).is_err());
        assert!(store
            .set_property(&id, Property::FontFamily("  ".to_string()))
            .is_err());
        assert!(store
            .set_property(&id, Property::Text("literal".to_string()))
            .is_err());
        assert!(store.set_property(&id, Property::Page(2)).is_err());

        store.set_property(&id, Property::FontSize(14.0)).unwrap();
        store.set_property(&id, Property::Bold(true)).unwrap();
        store
            .set_property(&id, Property::TextAlign(TextAlign::Justify))
            .unwrap();
        store
            .set_property(
                &id,
                Property::Binding {
                    data_source_id: "user".to_string(),
                    field_id: "nom".to_string(),
                },
            )
            .unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!(var.typography.font_size_pt, 14.0);
        assert!(var.typography.bold);
        assert_eq!(var.text_align, TextAlign::Justify);
        assert_eq!(var.content, VariableContent::bound("user", "nom"));
    }

    #[test]
    fn test_failed_set_property_leaves_variable_untouched() {
        let mut store = a4_store(1);
        let id = store.place(bound(), Point::new(10.0, 10.0), 1).unwrap();
        let before = store.get(&id).unwrap().clone();

        assert!(store.set_property(&id, Property::FontSize(99.0)).is_err());
        assert_eq!(store.get(&id).unwrap(), &before);
    }

    #[test]
    fn test_property_parse() {
        assert_eq!(
            Property::parse("textAlign", "center").unwrap(),
            Property::TextAlign(TextAlign::Center)
        );
        assert_eq!(
            Property::parse("binding", "mission.lieu").unwrap(),
            Property::Binding {
                data_source_id: "mission".to_string(),
                field_id: "lieu".to_string()
            }
        );
        assert_eq!(Property::parse("bold", "true").unwrap(), Property::Bold(true));
        assert!(matches!(
            Property::parse("verticalAlign", "centre"),
            Err(EngineError::Validation(_))
        ));
        assert!(Property::parse("fontSizePt", "big").is_err());
        assert!(Property::parse("colour", "red").is_err());
    }

    #[test]
    fn test_move_to_other_page() {
        let mut store = VariableStore::new(
            DocumentGeometry::new(vec![PageSize::a4(), PageSize::new(300.0, 200.0)]),
            EngineConfig::default(),
        );
        let id = store.place(bound(), Point::new(400.0, 500.0), 1).unwrap();
        store.set_property(&id, Property::Page(2)).unwrap();

        let var = store.get(&id).unwrap();
        assert_eq!(var.position, Position { x: 200.0, y: 170.0, page: 2 });
    }

    #[test]
    fn test_remove_twice() {
        let mut store = a4_store(1);
        let a = store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        let b = store.place(bound(), Point::new(50.0, 50.0), 1).unwrap();
        let c = store.place(bound(), Point::new(100.0, 100.0), 1).unwrap();

        store.remove(&b).unwrap();
        let after_first: Vec<Variable> = store.variables().to_vec();
        assert_eq!(
            store.remove(&b).unwrap_err(),
            EngineError::NotFound(b.clone())
        );
        assert_eq!(store.variables(), after_first.as_slice());

        let ids: Vec<&VariableId> = store.list(None).iter().map(|v| &v.id).collect();
        assert_eq!(ids, vec![&a, &c]);
    }

    #[test]
    fn test_list_filters_by_page_in_paint_order() {
        let mut store = a4_store(2);
        let a = store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        store.place(bound(), Point::new(0.0, 0.0), 2).unwrap();
        let c = store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();

        let page1: Vec<&VariableId> = store.list(Some(1)).iter().map(|v| &v.id).collect();
        assert_eq!(page1, vec![&a, &c]);
        assert_eq!(store.list(None).len(), 3);
    }

    #[test]
    fn test_hit_test_returns_topmost() {
        let mut store = a4_store(1);
        store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        let top = store.place(bound(), Point::new(50.0, 10.0), 1).unwrap();

        assert_eq!(store.hit_test(1, Point::new(60.0, 20.0)).unwrap().id, top);
        assert!(store.hit_test(1, Point::new(400.0, 400.0)).is_none());
        assert!(store.hit_test(2, Point::new(60.0, 20.0)).is_none());
    }

    #[test]
    fn test_from_variables_rejects_duplicates_and_clamps() {
        let mut source = a4_store(1);
        let id = source.place(bound(), Point::new(10.0, 10.0), 1).unwrap();
        let mut vars = source.variables().to_vec();

        vars[0].size.width = 900.0;
        let store = VariableStore::from_variables(
            DocumentGeometry::uniform(1, PageSize::a4()),
            EngineConfig::default(),
            vars.clone(),
        )
        .unwrap();
        let loaded = store.get(&id).unwrap();
        assert_eq!((loaded.position.x, loaded.size.width), (10.0, 585.0));
        assert!(store.is_dirty());

        vars.push(vars[0].clone());
        assert!(VariableStore::from_variables(
            DocumentGeometry::uniform(1, PageSize::a4()),
            EngineConfig::default(),
            vars,
        )
        .is_err());
    }

    #[test]
    fn test_from_variables_in_bounds_stays_clean() {
        let mut source = a4_store(1);
        source.place(bound(), Point::new(10.0, 10.0), 1).unwrap();
        let store = VariableStore::from_variables(
            DocumentGeometry::uniform(1, PageSize::a4()),
            EngineConfig::default(),
            source.variables().to_vec(),
        )
        .unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_from_variables_rejects_bad_typography() {
        let mut source = a4_store(1);
        source
            .place(Some(VariableContent::raw("Objet")), Point::new(10.0, 10.0), 1)
            .unwrap();
        source.place(bound(), Point::new(10.0, 100.0), 1).unwrap();
        let good = source.variables().to_vec();

        let load = |vars: Vec<Variable>| {
            VariableStore::from_variables(
                DocumentGeometry::uniform(1, PageSize::a4()),
                EngineConfig::default(),
                vars,
            )
        };
        assert!(load(good.clone()).is_ok());

        let mut vars = good.clone();
        vars[0].typography.font_size_pt = 99.0;
        assert!(matches!(load(vars), Err(EngineError::Validation(_))));

        let mut vars = good.clone();
        vars[0].typography.line_height = Some(10.0);
        assert!(matches!(load(vars), Err(EngineError::Validation(_))));

        let mut vars = good.clone();
        vars[0].typography.font_family = String::new();
        assert!(matches!(load(vars), Err(EngineError::Validation(_))));

        let mut vars = good;
        vars[1].typography.line_height = Some(1.2);
        assert!(matches!(load(vars), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_line_height_is_raw_text_only() {
        let mut store = a4_store(1);
        let bound_id = store.place(bound(), Point::new(10.0, 10.0), 1).unwrap();
        let raw_id = store
            .place(Some(VariableContent::raw("Objet")), Point::new(10.0, 100.0), 1)
            .unwrap();

        let before = store.get(&bound_id).unwrap().clone();
        assert!(matches!(
            store.set_property(&bound_id, Property::LineHeight(2.0)),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(store.get(&bound_id).unwrap(), &before);

        let json = serde_json::to_value(store.get(&bound_id).unwrap()).unwrap();
        assert!(json["typography"].get("lineHeight").is_none());

        store.set_property(&raw_id, Property::LineHeight(2.0)).unwrap();
        assert_eq!(store.get(&raw_id).unwrap().typography.line_height, Some(2.0));
    }

    #[test]
    fn test_mark_clean() {
        let mut store = a4_store(1);
        store.place(bound(), Point::new(0.0, 0.0), 1).unwrap();
        store.mark_clean();
        assert!(!store.is_dirty());
    }
}
