//! Content blocks of the rendered paper.
//!
//! A block is an atomic unit of the underlying document (paragraph, table, or
//! image) with a fixed position in document space. Blocks are produced by the
//! host renderer and are strictly read-only to the engine: extraction and
//! snapshot composition read them, nothing ever mutates them.
//!
//! [`BlockSet`] doubles as the layout provider: interaction and queue logic
//! resolve block ids to rectangles through [`BlockSet::layout_of`] instead of
//! measuring a live rendering surface, which keeps the geometry testable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, MIN_RESIZE_EXTENT};

/// The kind of content a block carries.
///
/// Papers can also contain heading/instruction/rubric blocks; those render as
/// text and are folded into `Paragraph` by the host before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Flowed text, possibly with embedded images
    Paragraph,
    /// Tabular content, carried as rendered HTML
    Table,
    /// One or more image resources
    Image,
}

/// An atomic unit of the rendered paper with a fixed position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Stable identifier assigned by the host document
    pub id: u64,
    /// What the block contains
    pub kind: BlockKind,
    /// Position in document space
    pub rect: Rect,
    /// Normalized text (paragraph blocks; empty otherwise)
    #[serde(default)]
    pub text: String,
    /// Rendered table markup (table blocks; empty otherwise)
    #[serde(default)]
    pub table_html: String,
    /// Image resource URIs (image blocks, or images embedded in a paragraph)
    #[serde(default)]
    pub images: Vec<String>,
}

impl ContentBlock {
    /// A paragraph block with the given text.
    pub fn paragraph(id: u64, rect: Rect, text: impl Into<String>) -> Self {
        Self {
            id,
            kind: BlockKind::Paragraph,
            rect,
            text: text.into(),
            table_html: String::new(),
            images: Vec::new(),
        }
    }

    /// A table block with the given markup.
    pub fn table(id: u64, rect: Rect, table_html: impl Into<String>) -> Self {
        Self {
            id,
            kind: BlockKind::Table,
            rect,
            text: String::new(),
            table_html: table_html.into(),
            images: Vec::new(),
        }
    }

    /// An image block with the given resources.
    pub fn image(id: u64, rect: Rect, images: Vec<String>) -> Self {
        Self {
            id,
            kind: BlockKind::Image,
            rect,
            text: String::new(),
            table_html: String::new(),
            images,
        }
    }

    /// Attach embedded images (paragraph blocks may carry inline images).
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// The blocks of one paper, in document (top-to-bottom layout) order.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    blocks: IndexMap<u64, ContentBlock>,
}

impl BlockSet {
    /// Empty block set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from blocks already in document order.
    ///
    /// A duplicate id replaces the earlier block, keeping its original slot.
    pub fn from_blocks(blocks: impl IntoIterator<Item = ContentBlock>) -> Self {
        let mut set = Self::new();
        for b in blocks {
            set.blocks.insert(b.id, b);
        }
        set
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when the paper has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: u64) -> Option<&ContentBlock> {
        self.blocks.get(&id)
    }

    /// Resolve a block id to its rectangle, if the block still exists.
    pub fn layout_of(&self, id: u64) -> Option<Rect> {
        self.blocks.get(&id).map(|b| b.rect)
    }

    /// Iterate blocks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentBlock> {
        self.blocks.values()
    }

    /// Bounding union of the rectangles behind `ids`.
    ///
    /// Ids that no longer resolve are ignored; `None` means none resolved.
    /// The result is clamped to a minimum 1x1 extent so a degenerate layout
    /// still yields a drawable rectangle.
    pub fn union_of(&self, ids: &[u64]) -> Option<Rect> {
        let rects = ids.iter().filter_map(|id| self.layout_of(*id));
        Rect::union_all(rects).map(|r| Rect {
            w: r.w.max(MIN_RESIZE_EXTENT),
            h: r.h.max(MIN_RESIZE_EXTENT),
            ..r
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> BlockSet {
        BlockSet::from_blocks([
            ContentBlock::paragraph(1, Rect::new(0.0, 0.0, 100.0, 30.0), "Question 1"),
            ContentBlock::table(2, Rect::new(0.0, 40.0, 100.0, 30.0), "<tr><td>a</td></tr>"),
            ContentBlock::image(3, Rect::new(0.0, 80.0, 50.0, 20.0), vec!["img/a.png".into()]),
        ])
    }

    #[test]
    fn test_document_order_preserved() {
        let set = sample_set();
        let ids: Vec<u64> = set.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_layout_of() {
        let set = sample_set();
        assert_eq!(set.layout_of(2), Some(Rect::new(0.0, 40.0, 100.0, 30.0)));
        assert_eq!(set.layout_of(99), None);
    }

    #[test]
    fn test_union_of_skips_missing_ids() {
        let set = sample_set();
        let r = set.union_of(&[1, 99, 3]).unwrap();
        assert_eq!(r, Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_union_of_all_missing() {
        let set = sample_set();
        assert!(set.union_of(&[50, 51]).is_none());
        assert!(set.union_of(&[]).is_none());
    }

    #[test]
    fn test_union_of_clamps_degenerate_extent() {
        let set = BlockSet::from_blocks([ContentBlock::paragraph(
            7,
            Rect::new(10.0, 10.0, 0.0, 0.0),
            "",
        )]);
        let r = set.union_of(&[7]).unwrap();
        assert_eq!(r.w, 1.0);
        assert_eq!(r.h, 1.0);
    }
}
