// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangles and the window ↔ container coordinate-space conversion.
//!
//! Hosts report layout in window space. All hit testing happens in *container space*: the
//! coordinate system of the drag-drop surface itself, anchored at its top-left corner. The
//! [`ContainerFrame`] is that anchor, measured once per drag.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_drag_drop::geometry::{ContainerFrame, contains_strict, layout_rect};
//!
//! let frame = ContainerFrame::new(layout_rect(20.0, 40.0, 300.0, 500.0));
//! let local = frame.to_container_space(layout_rect(30.0, 50.0, 100.0, 100.0));
//! assert_eq!(local, layout_rect(10.0, 10.0, 100.0, 100.0));
//!
//! // Edges are exclusive.
//! assert!(contains_strict(local, Point::new(60.0, 60.0)));
//! assert!(!contains_strict(local, Point::new(10.0, 60.0)));
//! ```

use kurbo::{Point, Rect, Vec2};

/// Build a rectangle from host layout values (`x`, `y`, `width`, `height`).
///
/// Unlike [`Rect::from_origin_size`], this does not normalize, so a negative
/// width or height stays visible to [`is_degenerate`].
#[must_use]
pub fn layout_rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, x + width, y + height)
}

/// Returns `true` if `rect` can never be a hit candidate.
///
/// That is the case for zero or negative width/height and for non-finite coordinates.
#[must_use]
pub fn is_degenerate(rect: Rect) -> bool {
    let finite =
        rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
    !finite || rect.width() <= 0.0 || rect.height() <= 0.0
}

/// Returns `true` if `pt` lies strictly inside `rect`.
///
/// A point exactly on any edge is outside.
#[must_use]
pub fn contains_strict(rect: Rect, pt: Point) -> bool {
    pt.x > rect.x0 && pt.x < rect.x1 && pt.y > rect.y0 && pt.y < rect.y1
}

/// Convert a window-space rectangle into the space of `frame`.
///
/// Subtracts the frame origin and preserves the size.
#[must_use]
pub fn to_container_space(window_rect: Rect, frame: Rect) -> Rect {
    window_rect - frame.origin().to_vec2()
}

/// The drag-drop surface's own rectangle, in window space.
///
/// The default frame sits at the window origin, which makes conversion the identity.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ContainerFrame(Rect);

impl ContainerFrame {
    /// Wrap a measured window-space rectangle.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self(rect)
    }

    /// The window-space rectangle of the surface.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.0
    }

    /// Offset of the surface's origin from the window origin.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.0.origin().to_vec2()
    }

    /// Convert a window-space rectangle into container space.
    #[must_use]
    pub fn to_container_space(&self, window_rect: Rect) -> Rect {
        to_container_space(window_rect, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frame_is_identity() {
        let r = layout_rect(12.5, -3.0, 40.0, 8.0);
        let frame = ContainerFrame::default();
        assert_eq!(frame.to_container_space(r), r);
        // Applying it twice changes nothing either.
        assert_eq!(frame.to_container_space(frame.to_container_space(r)), r);
    }

    #[test]
    fn conversion_subtracts_origin_and_keeps_size() {
        let frame = layout_rect(100.0, 50.0, 10.0, 10.0);
        let r = to_container_space(layout_rect(130.0, 80.0, 25.0, 35.0), frame);
        assert_eq!(r.origin(), Point::new(30.0, 30.0));
        assert_eq!(r.width(), 25.0);
        assert_eq!(r.height(), 35.0);
    }

    #[test]
    fn negative_size_is_kept_and_degenerate() {
        let r = layout_rect(10.0, 10.0, -5.0, 20.0);
        assert_eq!(r.width(), -5.0);
        assert!(is_degenerate(r));
    }

    #[test]
    fn degenerate_cases() {
        assert!(is_degenerate(layout_rect(0.0, 0.0, 0.0, 10.0)));
        assert!(is_degenerate(layout_rect(0.0, 0.0, 10.0, 0.0)));
        assert!(is_degenerate(layout_rect(f64::NAN, 0.0, 10.0, 10.0)));
        assert!(is_degenerate(layout_rect(0.0, 0.0, f64::INFINITY, 10.0)));
        assert!(!is_degenerate(layout_rect(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn contains_is_exclusive_on_every_edge() {
        let r = layout_rect(0.0, 0.0, 100.0, 100.0);
        assert!(contains_strict(r, Point::new(50.0, 50.0)));
        assert!(!contains_strict(r, Point::new(0.0, 50.0)));
        assert!(!contains_strict(r, Point::new(100.0, 50.0)));
        assert!(!contains_strict(r, Point::new(50.0, 0.0)));
        assert!(!contains_strict(r, Point::new(50.0, 100.0)));
        assert!(contains_strict(r, Point::new(99.999, 0.001)));
    }
}
