//! Drag-to-resize state machine.
//!
//! `Idle -> Dragging -> Idle`. Pointer listeners belong to the `Dragging`
//! state: the host attaches them when a session starts and detaches them when
//! it ends, so a session id also names the listener set. Callbacks carrying
//! the id of a finished session are ignored.

use crate::layout::ColumnModel;

/// Identifies one drag session
pub type SessionId = u64;

/// State of an active drag
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub id: SessionId,
    /// Column being resized
    pub key: String,
    /// Pointer X when the drag started
    pub start_x: f32,
    /// Column's current width when the drag started
    pub start_width: f32,
    /// Floor for the dragged width
    pub min_width: f32,
}

impl ResizeSession {
    /// Width for a pointer at `pointer_x`
    pub fn width_at(&self, pointer_x: f32) -> f32 {
        (self.start_width + (pointer_x - self.start_x)).max(self.min_width)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Dragging(ResizeSession),
}

/// Result of starting a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragStart {
    pub session: SessionId,
    /// A session that was still active and has been ended
    pub ended: Option<SessionId>,
}

/// Converts pointer drags on a column border into column width changes
#[derive(Debug, Default)]
pub struct ResizeController {
    state: DragState,
    next_id: SessionId,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging the border of `key` at `pointer_x`.
    ///
    /// Returns None if the column is unknown. A session that is somehow
    /// still active is ended first.
    pub fn start(
        &mut self,
        columns: &ColumnModel,
        key: &str,
        pointer_x: f32,
    ) -> Option<DragStart> {
        let start_width = columns.width(key)?;
        let min_width = columns.min_width(key)?;

        let ended = self.cancel();
        self.next_id += 1;
        let id = self.next_id;
        log::trace!("resize start: column={key} x={pointer_x} width={start_width}");
        self.state = DragState::Dragging(ResizeSession {
            id,
            key: key.to_string(),
            start_x: pointer_x,
            start_width,
            min_width,
        });
        Some(DragStart { session: id, ended })
    }

    /// Pointer moved during session `id`.
    ///
    /// Writes the new width to the column model and returns it; returns
    /// None for a stale session.
    pub fn drag(&mut self, id: SessionId, pointer_x: f32, columns: &mut ColumnModel) -> Option<f32> {
        let DragState::Dragging(session) = &self.state else {
            return None;
        };
        if session.id != id {
            return None;
        }
        let width = session.width_at(pointer_x);
        if !columns.set_width(&session.key, width) {
            return None;
        }
        log::trace!("resize move: column={} width={width}", session.key);
        Some(width)
    }

    /// Pointer released for session `id`; returns false for a stale session
    pub fn end(&mut self, id: SessionId) -> bool {
        match &self.state {
            DragState::Dragging(session) if session.id == id => {
                log::trace!("resize end: column={}", session.key);
                self.state = DragState::Idle;
                true
            }
            _ => false,
        }
    }

    /// End any active session, returning its id
    pub fn cancel(&mut self) -> Option<SessionId> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Some(session.id),
            DragState::Idle => None,
        }
    }

    /// True while a drag is in progress
    pub fn is_resizing(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }
}
