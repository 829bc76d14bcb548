//! Property tests for the geometry layer:
//! - normalization always yields non-negative extents
//! - intersection is symmetric and contained in both operands
//! - edge-touching rectangles never intersect under the strict threshold
//! - resize respects the minimum extent clamp for every handle

use exam_lasso::geometry::{resize, Handle, Point, Rect, INTERSECT_EPSILON, MIN_RESIZE_EXTENT};
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = Point> {
    (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
}

fn arb_rect() -> impl Strategy<Value = Rect> {
    (
        -1000.0f32..1000.0,
        -1000.0f32..1000.0,
        0.0f32..500.0,
        0.0f32..500.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn normalize_never_yields_negative_extent(a in arb_point(), b in arb_point()) {
        let rect = Rect::normalize(a, b);
        prop_assert!(rect.w >= 0.0);
        prop_assert!(rect.h >= 0.0);
    }

    #[test]
    fn normalize_is_corner_order_agnostic(a in arb_point(), b in arb_point()) {
        prop_assert_eq!(Rect::normalize(a, b), Rect::normalize(b, a));
    }

    #[test]
    fn intersection_is_symmetric(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(
            a.intersect(&b, INTERSECT_EPSILON),
            b.intersect(&a, INTERSECT_EPSILON)
        );
    }

    #[test]
    fn intersection_is_contained_in_both(a in arb_rect(), b in arb_rect()) {
        if let Some(overlap) = a.intersect(&b, INTERSECT_EPSILON) {
            prop_assert!(overlap.left() >= a.left() - 1e-3);
            prop_assert!(overlap.right() <= a.right() + 1e-3);
            prop_assert!(overlap.left() >= b.left() - 1e-3);
            prop_assert!(overlap.right() <= b.right() + 1e-3);
            prop_assert!(overlap.top() >= a.top() - 1e-3);
            prop_assert!(overlap.bottom() <= a.bottom() + 1e-3);
            prop_assert!(overlap.top() >= b.top() - 1e-3);
            prop_assert!(overlap.bottom() <= b.bottom() + 1e-3);
        }
    }

    #[test]
    fn intersection_exceeds_threshold_in_both_axes(a in arb_rect(), b in arb_rect()) {
        if let Some(overlap) = a.intersect(&b, INTERSECT_EPSILON) {
            prop_assert!(overlap.w > INTERSECT_EPSILON);
            prop_assert!(overlap.h > INTERSECT_EPSILON);
        }
    }

    #[test]
    fn union_contains_both_operands(a in arb_rect(), b in arb_rect()) {
        let u = a.union(&b);
        prop_assert!(u.left() <= a.left() && u.left() <= b.left());
        prop_assert!(u.right() >= a.right() && u.right() >= b.right());
        prop_assert!(u.top() <= a.top() && u.top() <= b.top());
        prop_assert!(u.bottom() >= a.bottom() && u.bottom() >= b.bottom());
    }

    #[test]
    fn resize_never_collapses_below_minimum(
        rect in arb_rect(),
        handle_idx in 0usize..8,
        dx in -2000.0f32..2000.0,
        dy in -2000.0f32..2000.0,
    ) {
        let handle = Handle::ALL[handle_idx];
        let resized = resize(&rect, handle, dx, dy);
        prop_assert!(resized.w >= MIN_RESIZE_EXTENT);
        prop_assert!(resized.h >= MIN_RESIZE_EXTENT);
    }

    #[test]
    fn resize_only_moves_the_handles_edges(
        rect in arb_rect(),
        dx in -50.0f32..50.0,
        dy in -50.0f32..50.0,
    ) {
        // An east-side handle never moves the left edge, and a south-side
        // handle never moves the top edge, while the clamp is not in play.
        let r = Rect::new(rect.x, rect.y, rect.w + 200.0, rect.h + 200.0);
        let se = resize(&r, Handle::SouthEast, dx, dy);
        prop_assert!((se.left() - r.left()).abs() < 1e-3);
        prop_assert!((se.top() - r.top()).abs() < 1e-3);
    }
}

#[test]
fn edge_touching_rectangles_do_not_intersect() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(100.0, 0.0, 100.0, 100.0);
    assert_eq!(a.intersect(&b, INTERSECT_EPSILON), None);

    // A sliver of overlap no wider than the threshold still does not count.
    let c = Rect::new(99.5, 0.0, 100.0, 100.0);
    assert_eq!(a.intersect(&c, INTERSECT_EPSILON), None);

    // But anything wider does.
    let d = Rect::new(98.0, 0.0, 100.0, 100.0);
    assert!(a.intersect(&d, INTERSECT_EPSILON).is_some());
}

#[test]
fn opposite_corner_drag_flips_cleanly() {
    // Dragging the west edge past the east edge leaves a clamped sliver
    // rather than a negative extent.
    let original = Rect::new(10.0, 10.0, 50.0, 50.0);
    let flipped = resize(&original, Handle::West, 200.0, 0.0);
    assert!(flipped.w >= MIN_RESIZE_EXTENT);
    assert!(flipped.h >= MIN_RESIZE_EXTENT);
}
