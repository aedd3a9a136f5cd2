// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing the drag's reference point against the drag-start snapshot.
//!
//! The reference point is the center of the dragged rectangle, in container space. Each
//! captured target rectangle is converted into container space and tested with exclusive
//! bounds: a point exactly on an edge is not a hit.
//!
//! ## Overlaps
//!
//! When several target rectangles contain the point, the first match in registration order
//! wins. Degenerate rectangles (zero or negative size, non-finite) never match.
//!
//! ```
//! use kurbo::Point;
//! use understory_drag_drop::geometry::{ContainerFrame, layout_rect};
//! use understory_drag_drop::hit::find_candidate;
//! use understory_drag_drop::registry::LayoutSnapshot;
//! use understory_drag_drop::DropTargetId;
//!
//! let snapshot = LayoutSnapshot::new(
//!     ContainerFrame::new(layout_rect(0.0, 100.0, 400.0, 400.0)),
//!     [
//!         (DropTargetId::from("a"), layout_rect(0.0, 100.0, 100.0, 100.0)),
//!         (DropTargetId::from("b"), layout_rect(50.0, 100.0, 100.0, 100.0)),
//!     ],
//! );
//! // (75, 50) is inside both; "a" registered first.
//! let hit = find_candidate(Point::new(75.0, 50.0), &snapshot);
//! assert_eq!(hit.map(|id| id.as_str()), Some("a"));
//! ```

use kurbo::Point;

use crate::geometry::{contains_strict, is_degenerate};
use crate::id::DropTargetId;
use crate::registry::LayoutSnapshot;

/// Find the target whose captured rectangle strictly contains `center`.
///
/// `center` is in container space; snapshot rectangles are converted using the snapshot's
/// own container frame.
#[must_use]
pub fn find_candidate(center: Point, snapshot: &LayoutSnapshot) -> Option<&DropTargetId> {
    let frame = snapshot.frame();
    snapshot
        .targets()
        .filter(|(_, rect)| !is_degenerate(*rect))
        .find(|(_, rect)| contains_strict(frame.to_container_space(*rect), center))
        .map(|(id, _)| id)
}
