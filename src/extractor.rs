//! Intersection-driven content extraction.
//!
//! Given a finalized selection rectangle, derive the structured payload from
//! whatever blocks it overlaps. A block counts only when the overlap exceeds
//! the epsilon in both axes, so selections that merely touch a block's edge do
//! not capture it. Items are emitted in document traversal order, never by
//! intersection area.

use log::debug;

use crate::blocks::{BlockKind, BlockSet, ContentBlock};
use crate::geometry::Rect;
use crate::region::{ContentItem, ContentType, RegionContent};

/// Extract the structured payload for `rect` from the paper's blocks.
///
/// Per-block derivation:
/// - paragraph: one text item (skipped when the trimmed text is empty), plus
///   an extra image item when the paragraph embeds images
/// - table: one table item, only when the trimmed markup is non-empty
/// - image: one image item listing the block's resources
///
/// # Examples
///
/// ```
/// use exam_lasso::blocks::{BlockSet, ContentBlock};
/// use exam_lasso::extractor::extract;
/// use exam_lasso::geometry::{Rect, INTERSECT_EPSILON};
/// use exam_lasso::region::ContentType;
///
/// let blocks = BlockSet::from_blocks([
///     ContentBlock::paragraph(1, Rect::new(0.0, 0.0, 100.0, 30.0), "Question 1"),
///     ContentBlock::table(2, Rect::new(0.0, 40.0, 100.0, 30.0), "<tr><td>5</td></tr>"),
/// ]);
/// let (content, ctype) = extract(&Rect::new(0.0, 0.0, 100.0, 50.0), &blocks, INTERSECT_EPSILON);
/// assert_eq!(content.items.len(), 2);
/// assert_eq!(ctype, ContentType::Mixed);
/// ```
pub fn extract(rect: &Rect, blocks: &BlockSet, epsilon: f32) -> (RegionContent, ContentType) {
    let mut items = Vec::new();
    for block in blocks.iter() {
        if rect.intersect(&block.rect, epsilon).is_none() {
            continue;
        }
        collect_items(block, &mut items);
    }
    if items.is_empty() {
        debug!(
            "extraction over ({:.0},{:.0} {:.0}x{:.0}) captured no blocks",
            rect.x, rect.y, rect.w, rect.h
        );
    }
    let content = RegionContent { items };
    let ctype = content.content_type();
    (content, ctype)
}

fn collect_items(block: &ContentBlock, items: &mut Vec<ContentItem>) {
    match block.kind {
        BlockKind::Image => {
            if !block.images.is_empty() {
                items.push(ContentItem::Image {
                    images: block.images.clone(),
                });
            }
        }
        BlockKind::Table => {
            if !block.table_html.trim().is_empty() {
                items.push(ContentItem::Table {
                    html: block.table_html.clone(),
                });
            }
        }
        BlockKind::Paragraph => {
            if !block.text.trim().is_empty() {
                items.push(ContentItem::Text {
                    text: block.text.clone(),
                });
            }
            // A paragraph with inline images contributes a second item.
            if !block.images.is_empty() {
                items.push(ContentItem::Image {
                    images: block.images.clone(),
                });
            }
        }
    }
}
