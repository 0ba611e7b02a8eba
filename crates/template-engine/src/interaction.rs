//! Pointer-driven interaction state machine
//!
//! Turns viewport pointer events into variable store operations. The
//! controller holds no rendering state, so it can be driven headlessly.
//!
//! ```text
//! Idle --arm--> Armed --down on canvas--> place --> Idle
//! Idle/Armed --down on variable--> Dragging --move--> move_to
//! Idle/Armed --down on handle--> Resizing --move--> resize
//! Dragging/Resizing --up/leave--> Idle
//! ```
//!
//! Every intermediate state is already clamped in the store, so releasing a
//! gesture commits nothing and there is no rollback.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::geometry::{Corner, Point, Rect, Viewport};
use crate::store::VariableStore;
use shared_types::{VariableContent, VariableId};

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Content queued for the next canvas click; consumed by it
    Armed(VariableContent),
    /// `grab_offset` is pointer minus variable origin, in page space
    Dragging { id: VariableId, grab_offset: Point },
    Resizing {
        id: VariableId,
        corner: Corner,
        start_rect: Rect,
        start_pointer: Point,
    },
}

/// Pointer events in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// Pointer left the canvas
    Leave,
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    Placed(VariableId),
    DragStarted(VariableId),
    ResizeStarted(VariableId, Corner),
    Moved(VariableId),
    Resized(VariableId),
    Released(VariableId),
    SelectionCleared,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    viewport: Viewport,
    page: u32,
    selection: Option<VariableId>,
    handle_size: f64,
}

impl InteractionController {
    pub fn new(viewport: Viewport, page: u32, config: &EngineConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            viewport,
            page,
            selection: None,
            handle_size: config.handle_size,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Variable property edits should target
    pub fn active_selection(&self) -> Option<&VariableId> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, id: Option<VariableId>) {
        self.selection = id;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_gesture_active(&self) -> bool {
        matches!(
            self.state,
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. }
        )
    }

    /// Queue a field or raw text for placement by the next canvas click
    pub fn arm(&mut self, content: VariableContent) -> Result<()> {
        if self.is_gesture_active() {
            return Err(EngineError::validation(
                "cannot arm a placement during a drag or resize",
            ));
        }
        tracing::debug!(kind = ?content.kind(), "armed for placement");
        self.state = InteractionState::Armed(content);
        Ok(())
    }

    pub fn disarm(&mut self) {
        if matches!(self.state, InteractionState::Armed(_)) {
            self.state = InteractionState::Idle;
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_idle("change the viewport")?;
        self.viewport = viewport;
        Ok(())
    }

    /// Switch the page pointer events apply to
    pub fn set_page(&mut self, page: u32) -> Result<()> {
        self.ensure_idle("change page")?;
        self.page = page;
        Ok(())
    }

    /// Drop the selection and any gesture that target `id`
    pub fn forget(&mut self, id: &VariableId) {
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        let in_gesture = match &self.state {
            InteractionState::Dragging { id: active, .. }
            | InteractionState::Resizing { id: active, .. } => active == id,
            _ => false,
        };
        if in_gesture {
            self.state = InteractionState::Idle;
        }
    }

    pub fn handle(&mut self, store: &mut VariableStore, event: PointerEvent) -> Result<Outcome> {
        match event {
            PointerEvent::Down(at) => self.pointer_down(store, at),
            PointerEvent::Move(at) => self.pointer_move(store, at),
            PointerEvent::Up(_) | PointerEvent::Leave => Ok(self.release()),
        }
    }

    fn pointer_down(&mut self, store: &mut VariableStore, at: Point) -> Result<Outcome> {
        // A down without the previous up ends that gesture first
        self.release();

        let point = self.viewport.to_page(at);
        let half = self.viewport.page_length(self.handle_size) / 2.0;

        for variable in store.list(Some(self.page)).into_iter().rev() {
            let rect = Rect::of(variable);

            if let Some(corner) = Corner::hit(&rect, point, half) {
                let id = variable.id.clone();
                tracing::debug!(variable_id = %id, ?corner, "resize started");
                self.selection = Some(id.clone());
                self.state = InteractionState::Resizing {
                    id: id.clone(),
                    corner,
                    start_rect: rect,
                    start_pointer: point,
                };
                return Ok(Outcome::ResizeStarted(id, corner));
            }

            if rect.contains(point) {
                let id = variable.id.clone();
                tracing::debug!(variable_id = %id, "drag started");
                self.selection = Some(id.clone());
                self.state = InteractionState::Dragging {
                    id: id.clone(),
                    grab_offset: point.offset_from(rect.origin()),
                };
                return Ok(Outcome::DragStarted(id));
            }
        }

        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Armed(content) => {
                match store.place(Some(content.clone()), point, self.page) {
                    Ok(id) => {
                        self.selection = Some(id.clone());
                        Ok(Outcome::Placed(id))
                    }
                    Err(e) => {
                        self.state = InteractionState::Armed(content);
                        Err(e)
                    }
                }
            }
            _ => {
                self.selection = None;
                Ok(Outcome::SelectionCleared)
            }
        }
    }

    fn pointer_move(&mut self, store: &mut VariableStore, at: Point) -> Result<Outcome> {
        let point = self.viewport.to_page(at);

        let result = match &self.state {
            InteractionState::Dragging { id, grab_offset } => store
                .move_to(id, point.offset_from(*grab_offset))
                .map(|_| Outcome::Moved(id.clone())),
            InteractionState::Resizing {
                id,
                corner,
                start_rect,
                start_pointer,
            } => {
                let proposed = corner.drag(start_rect, point.offset_from(*start_pointer));
                store
                    .resize(id, *corner, proposed)
                    .map(|_| Outcome::Resized(id.clone()))
            }
            InteractionState::Idle | InteractionState::Armed(_) => Ok(Outcome::Ignored),
        };

        // The variable vanished under the gesture
        if let Err(EngineError::NotFound(id)) = &result {
            tracing::debug!(variable_id = %id, "gesture target removed, back to idle");
            self.forget(&id.clone());
        }
        result
    }

    fn release(&mut self) -> Outcome {
        match &self.state {
            InteractionState::Dragging { id, .. } | InteractionState::Resizing { id, .. } => {
                let id = id.clone();
                tracing::debug!(variable_id = %id, "gesture released");
                self.state = InteractionState::Idle;
                Outcome::Released(id)
            }
            _ => Outcome::Ignored,
        }
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        if self.is_gesture_active() {
            return Err(EngineError::validation(format!(
                "cannot {} during a drag or resize",
                action
            )));
        }
        Ok(())
    }
}
