//! Snapshot composition: a cropped, scaled preview of a region's content.
//!
//! The compositor does no rasterizing itself; it computes, for every block a
//! region overlaps, where that block's visible crop sits inside the scene,
//! and a single scale factor that fits the scene to a target viewport. The
//! host places and clips its own rendered blocks from these instructions.

use serde::{Deserialize, Serialize};

use crate::blocks::BlockSet;
use crate::geometry::Rect;

/// Smallest scale the fit will produce, matching the preview's zoom floor.
pub const MIN_SCALE: f32 = 0.05;

/// Zoom step applied by [`SnapshotScene::zoom_in`]/[`SnapshotScene::zoom_out`].
pub const ZOOM_STEP: f32 = 1.2;

/// The target viewport a snapshot is fitted to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width in device units
    pub width: f32,
    /// Viewport height in device units
    pub height: f32,
}

impl Viewport {
    /// Create a viewport of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// One block's visible slice within a composed scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// The block to render
    pub block_id: u64,
    /// Where the visible slice sits, in scene coordinates
    pub placement: Rect,
    /// Offset of the block's own origin relative to the slice (negative,
    /// used to shift the full block render under the clip)
    pub block_offset: (f32, f32),
}

/// A composed snapshot: positioned block crops plus a fit scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotScene {
    /// Scene width (the region's width, minimum 1)
    pub width: f32,
    /// Scene height (the region's height, minimum 1)
    pub height: f32,
    /// Visible block slices in document order
    pub items: Vec<SnapshotItem>,
    /// Scale that fits the scene to the requested viewport
    pub scale: f32,
}

impl SnapshotScene {
    /// Grow the scale by one zoom step.
    pub fn zoom_in(&mut self) {
        self.scale *= ZOOM_STEP;
    }

    /// Shrink the scale by one zoom step, respecting the floor.
    pub fn zoom_out(&mut self) {
        self.scale = (self.scale / ZOOM_STEP).max(MIN_SCALE);
    }
}

/// Compose a snapshot of `rect` against the paper's blocks.
///
/// The scale uses the larger of the two axis factors (cover fit): the scene
/// always fills the viewport and may crop, it never letterboxes.
pub fn compose(rect: &Rect, blocks: &BlockSet, viewport: Viewport, epsilon: f32) -> SnapshotScene {
    let mut items = Vec::new();
    for block in blocks.iter() {
        let Some(overlap) = rect.intersect(&block.rect, epsilon) else {
            continue;
        };
        items.push(SnapshotItem {
            block_id: block.id,
            placement: Rect::new(
                overlap.x - rect.x,
                overlap.y - rect.y,
                overlap.w,
                overlap.h,
            ),
            block_offset: (block.rect.x - overlap.x, block.rect.y - overlap.y),
        });
    }

    let width = rect.w.max(1.0);
    let height = rect.h.max(1.0);
    let sx = viewport.width / width;
    let sy = viewport.height / height;
    let scale = sx.max(sy).max(MIN_SCALE);

    SnapshotScene {
        width,
        height,
        items,
        scale,
    }
}
