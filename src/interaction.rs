//! The interaction controller: pointer gestures over the annotation surface.
//!
//! One state machine per operator session. Drawing a new selection and
//! resizing an existing region are separate entry points: drawing starts from
//! a raw pointer-down on the canvas, resizing only through the explicit
//! resize affordance on a persisted region. While the metadata form is open
//! the canvas ignores pointer input.
//!
//! Resize gestures always re-apply against the rectangle captured when the
//! handle was grabbed; deltas are measured from the grab point, never
//! accumulated move-to-move, so there is no rounding drift however long the
//! drag lasts.

use log::debug;

use crate::geometry::{resize, Handle, Point, Rect};

/// The controller's current gesture state.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    /// No gesture in progress
    Idle,
    /// A new selection is being dragged out
    Drawing {
        /// Where the drag started
        anchor: Point,
        /// Live selection, normalized every move
        rect: Rect,
    },
    /// The selection is final and the metadata form is open
    PendingMetadata {
        /// The selection awaiting metadata
        rect: Rect,
    },
    /// A persisted region's geometry is being adjusted
    Resizing {
        /// The region being resized
        region_id: u64,
        /// Geometry frozen at grab time
        original: Rect,
        /// The handle grabbed
        handle: Handle,
        /// Pointer position at grab time
        grab: Point,
        /// Live result of the drag so far
        preview: Rect,
    },
}

/// What a pointer event amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing actionable (event ignored in the current state)
    Ignored,
    /// The live selection changed; redraw it
    SelectionChanged(Rect),
    /// A selection was finalized; open the metadata form for it
    MetadataRequested(Rect),
    /// A drag that never moved was discarded without opening the form
    EmptyDragDiscarded,
    /// A resize drag moved; redraw the preview
    ResizePreview(Rect),
    /// A resize drag finished; persist the new geometry
    ResizeFinished {
        /// The region whose geometry changed
        region_id: u64,
        /// The final rectangle
        rect: Rect,
    },
    /// The in-progress gesture was abandoned
    Cancelled,
}

/// Pointer-gesture state machine for one annotation surface.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: GestureState,
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle
    }
}

impl InteractionController {
    /// A controller in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current gesture state.
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// True while the metadata form is open and the canvas is inert.
    pub fn awaiting_metadata(&self) -> bool {
        matches!(self.state, GestureState::PendingMetadata { .. })
    }

    /// Pointer pressed on the canvas: start drawing a new selection.
    ///
    /// Ignored unless the controller is idle (a modal form or an active
    /// resize owns the pointer until it finishes).
    pub fn pointer_down(&mut self, at: Point) -> GestureOutcome {
        match self.state {
            GestureState::Idle => {
                let rect = Rect::normalize(at, at);
                self.state = GestureState::Drawing { anchor: at, rect };
                GestureOutcome::SelectionChanged(rect)
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Pointer moved: update the live selection or resize preview.
    pub fn pointer_move(&mut self, at: Point) -> GestureOutcome {
        match &mut self.state {
            GestureState::Drawing { anchor, rect } => {
                *rect = Rect::normalize(*anchor, at);
                GestureOutcome::SelectionChanged(*rect)
            }
            GestureState::Resizing {
                original,
                handle,
                grab,
                preview,
                ..
            } => {
                let dx = at.x - grab.x;
                let dy = at.y - grab.y;
                *preview = resize(original, *handle, dx, dy);
                GestureOutcome::ResizePreview(*preview)
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Pointer released: finalize the gesture.
    ///
    /// A draw that never moved is discarded silently; it never opens the
    /// metadata form. A finished resize hands back the new geometry for a
    /// geometry-only update.
    pub fn pointer_up(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Drawing { rect, .. } => {
                if rect.is_empty() {
                    debug!("zero-motion drag discarded");
                    self.state = GestureState::Idle;
                    GestureOutcome::EmptyDragDiscarded
                } else {
                    self.state = GestureState::PendingMetadata { rect };
                    GestureOutcome::MetadataRequested(rect)
                }
            }
            GestureState::Resizing {
                region_id, preview, ..
            } => {
                self.state = GestureState::Idle;
                GestureOutcome::ResizeFinished {
                    region_id,
                    rect: preview,
                }
            }
            other => {
                self.state = other;
                GestureOutcome::Ignored
            }
        }
    }

    /// Begin resizing a persisted region through its explicit affordance.
    ///
    /// `original` is captured once, here; every subsequent move resolves
    /// against it. Ignored while the metadata form is open.
    pub fn begin_resize(
        &mut self,
        region_id: u64,
        original: Rect,
        handle: Handle,
        grab: Point,
    ) -> GestureOutcome {
        match self.state {
            GestureState::Idle => {
                self.state = GestureState::Resizing {
                    region_id,
                    original,
                    handle,
                    grab,
                    preview: original,
                };
                GestureOutcome::ResizePreview(original)
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Re-open the metadata step for an existing selection (edit flow, or a
    /// queue candidate being presented).
    pub fn present_metadata(&mut self, rect: Rect) {
        self.state = GestureState::PendingMetadata { rect };
    }

    /// The metadata form was submitted successfully; return to idle.
    pub fn metadata_committed(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Abandon whatever gesture is in progress.
    ///
    /// Cancelling a resize discards the preview without touching the region;
    /// cancelling the metadata step discards the draft (the session decides
    /// whether a queue candidate needs requeueing).
    pub fn cancel(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => GestureOutcome::Ignored,
            _ => GestureOutcome::Cancelled,
        }
    }
}
