// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag session: the hover/drop state machine for one active drag.
//!
//! A [`DragSession`] exists from the moment the drag-start layout snapshot is complete until
//! the drag ends. It owns the eligibility set (fixed for its lifetime), the snapshot it hit
//! tests against, the container-space origin of the dragged rectangle, the live translation,
//! and the currently hovered target.
//!
//! The session performs no callbacks. Like the other Understory state managers it accepts
//! pre-computed input and returns transition events; delivering those to consumers is the
//! job of [`DragDropController`](crate::DragDropController).
//!
//! ## Transition policy
//!
//! On each move the center of the translated rectangle is hit tested:
//!
//! - No candidate, an ineligible candidate, or a candidate that is no longer registered:
//!   an active hover is left.
//! - A different eligible candidate: the previous hover (if any) is left, then the candidate
//!   is entered.
//! - The same candidate as the current hover: nothing happens.
//!
//! ```
//! use kurbo::Vec2;
//! use understory_drag_drop::geometry::{ContainerFrame, layout_rect};
//! use understory_drag_drop::registry::{DropRegistration, DropRegistry, LayoutSnapshot, MeasureTicket};
//! use understory_drag_drop::session::{DragSession, DropEvent};
//! use understory_drag_drop::{DragId, DropTargetId};
//!
//! let mut registry = DropRegistry::new();
//! registry.register(DropRegistration::new("a", |_: MeasureTicket| {}));
//! let snapshot = LayoutSnapshot::new(
//!     ContainerFrame::default(),
//!     [(DropTargetId::from("a"), layout_rect(0.0, 0.0, 100.0, 100.0))],
//! );
//! let eligible = DragSession::default_eligibility(&registry, None);
//! let mut session = DragSession::new(
//!     DragId::from("card"),
//!     eligible,
//!     snapshot,
//!     layout_rect(200.0, 200.0, 20.0, 20.0),
//!     Vec2::ZERO,
//! );
//!
//! let events = session.apply_move(Vec2::new(-160.0, -160.0), &registry);
//! assert_eq!(events.as_slice(), &[DropEvent::Enter(DropTargetId::from("a"))]);
//! assert!(session.apply_move(Vec2::new(-150.0, -160.0), &registry).is_empty());
//! ```

use hashbrown::HashSet;
use kurbo::{Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::hit::find_candidate;
use crate::id::{DragId, DropTargetId};
use crate::registry::{DropRegistry, LayoutSnapshot};

/// A hover transition produced by [`DragSession::apply_move`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropEvent {
    /// The hover on this target ended.
    Leave(DropTargetId),
    /// The drag started hovering this target.
    Enter(DropTargetId),
}

/// Transitions for one move, leave before enter.
pub type DropEvents = SmallVec<[DropEvent; 2]>;

/// How a drag ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// The drag ended while hovering `target`.
    Dropped {
        /// The dragged element.
        drag_id: DragId,
        /// The target it was dropped on.
        target: DropTargetId,
    },
    /// The drag ended with no active hover.
    Cancelled {
        /// The dragged element.
        drag_id: DragId,
    },
}

impl DragOutcome {
    /// The dragged element.
    #[must_use]
    pub fn drag_id(&self) -> &DragId {
        match self {
            Self::Dropped { drag_id, .. } | Self::Cancelled { drag_id } => drag_id,
        }
    }

    /// The drop target, if the drag was dropped.
    #[must_use]
    pub fn target(&self) -> Option<&DropTargetId> {
        match self {
            Self::Dropped { target, .. } => Some(target),
            Self::Cancelled { .. } => None,
        }
    }
}

/// State for one in-progress drag.
#[derive(Clone, Debug)]
pub struct DragSession {
    drag_id: DragId,
    valid_drop_ids: HashSet<DropTargetId>,
    layout: LayoutSnapshot,
    origin: Rect,
    translation: Vec2,
    hover: Option<DropTargetId>,
}

impl DragSession {
    /// Start a session.
    ///
    /// `window_rect` is the dragged content's window-space rectangle; it is converted into
    /// container space with the snapshot's frame. No target is hovered yet.
    pub fn new(
        drag_id: DragId,
        valid_drop_ids: impl IntoIterator<Item = DropTargetId>,
        layout: LayoutSnapshot,
        window_rect: Rect,
        translation: Vec2,
    ) -> Self {
        let origin = layout.frame().to_container_space(window_rect);
        Self {
            drag_id,
            valid_drop_ids: valid_drop_ids.into_iter().collect(),
            layout,
            origin,
            translation,
            hover: None,
        }
    }

    /// Every registered target except the one the drag originated from.
    #[must_use]
    pub fn default_eligibility(
        registry: &DropRegistry,
        source: Option<&DropTargetId>,
    ) -> HashSet<DropTargetId> {
        registry
            .ids()
            .filter(|id| Some(*id) != source)
            .cloned()
            .collect()
    }

    /// The dragged element.
    #[must_use]
    pub fn drag_id(&self) -> &DragId {
        &self.drag_id
    }

    /// Targets this drag may be dropped on.
    #[must_use]
    pub fn valid_drop_ids(&self) -> &HashSet<DropTargetId> {
        &self.valid_drop_ids
    }

    /// Returns `true` if `id` is in the eligibility set.
    #[must_use]
    pub fn is_eligible(&self, id: &str) -> bool {
        self.valid_drop_ids.contains(id)
    }

    /// The hovered target, if any.
    #[must_use]
    pub fn hover(&self) -> Option<&DropTargetId> {
        self.hover.as_ref()
    }

    /// The layout captured at drag start.
    #[must_use]
    pub fn layout(&self) -> &LayoutSnapshot {
        &self.layout
    }

    /// The dragged rectangle at drag start, in container space.
    #[must_use]
    pub fn origin(&self) -> Rect {
        self.origin
    }

    /// The latest translation.
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// The dragged rectangle at the latest translation, in container space.
    #[must_use]
    pub fn current_rect(&self) -> Rect {
        self.origin + self.translation
    }

    /// The hit-test reference point.
    #[must_use]
    pub fn center(&self) -> Point {
        self.current_rect().center()
    }

    /// Apply a move to `translation` and return the resulting hover transitions.
    ///
    /// `registry` is only consulted for membership: a snapshot entry whose target has since
    /// unregistered is not a candidate.
    pub fn apply_move(&mut self, translation: Vec2, registry: &DropRegistry) -> DropEvents {
        self.translation = translation;
        let center = self.center();
        let candidate = find_candidate(center, &self.layout)
            .filter(|id| self.valid_drop_ids.contains(*id) && registry.contains(id.as_str()))
            .cloned();
        tracing::trace!(drag = %self.drag_id, ?center, ?candidate, "drag move");
        self.set_hover(candidate)
    }

    /// End the hover on `id`, if it is the hovered target.
    ///
    /// Used when a hovered target unmounts mid-drag.
    pub fn clear_hover_on(&mut self, id: &str) -> Option<DropEvent> {
        if self.hover.as_ref().is_some_and(|h| h.as_str() == id) {
            self.hover.take().map(DropEvent::Leave)
        } else {
            None
        }
    }

    /// End the session.
    ///
    /// Dropped if a hover is active, cancelled otherwise. The caller owes the dropped target
    /// its leave notification.
    #[must_use]
    pub fn finish(self) -> DragOutcome {
        match self.hover {
            Some(target) => DragOutcome::Dropped {
                drag_id: self.drag_id,
                target,
            },
            None => DragOutcome::Cancelled {
                drag_id: self.drag_id,
            },
        }
    }

    fn set_hover(&mut self, candidate: Option<DropTargetId>) -> DropEvents {
        let mut events = DropEvents::new();
        if candidate == self.hover {
            return events;
        }
        if let Some(prev) = self.hover.take() {
            events.push(DropEvent::Leave(prev));
        }
        if let Some(next) = candidate {
            events.push(DropEvent::Enter(next.clone()));
            self.hover = Some(next);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ContainerFrame, layout_rect};
    use crate::registry::{DropRegistration, MeasureTicket};
    use alloc::vec;
    use alloc::vec::Vec;

    fn registry(ids: &[&str]) -> DropRegistry {
        let mut registry = DropRegistry::new();
        for id in ids {
            registry.register(DropRegistration::new(*id, |_: MeasureTicket| {}));
        }
        registry
    }

    fn snapshot() -> LayoutSnapshot {
        LayoutSnapshot::new(
            ContainerFrame::default(),
            [
                (DropTargetId::from("A"), layout_rect(0.0, 0.0, 100.0, 100.0)),
                (DropTargetId::from("B"), layout_rect(0.0, 150.0, 100.0, 100.0)),
            ],
        )
    }

    // A 20x20 drag starting at (290, 290): center (300, 300), outside both targets.
    fn session(valid: &[&str]) -> DragSession {
        DragSession::new(
            DragId::from("drag"),
            valid.iter().map(|id| DropTargetId::from(*id)),
            snapshot(),
            layout_rect(290.0, 290.0, 20.0, 20.0),
            Vec2::ZERO,
        )
    }

    // Translation that puts the center at (x, y).
    fn to(x: f64, y: f64) -> Vec2 {
        Vec2::new(x - 300.0, y - 300.0)
    }

    fn enter(id: &str) -> DropEvent {
        DropEvent::Enter(id.into())
    }

    fn leave(id: &str) -> DropEvent {
        DropEvent::Leave(id.into())
    }

    #[test]
    fn enter_move_within_then_switch() {
        let reg = registry(&["A", "B"]);
        let mut s = session(&["A", "B"]);

        assert_eq!(s.apply_move(to(50.0, 50.0), &reg).as_slice(), &[enter("A")]);
        assert!(s.apply_move(to(50.0, 60.0), &reg).is_empty());
        assert_eq!(
            s.apply_move(to(50.0, 175.0), &reg).as_slice(),
            &[leave("A"), enter("B")]
        );
        assert_eq!(s.hover().map(DropTargetId::as_str), Some("B"));
    }

    #[test]
    fn leaving_to_empty_space_clears_hover() {
        let reg = registry(&["A", "B"]);
        let mut s = session(&["A", "B"]);
        s.apply_move(to(50.0, 50.0), &reg);
        assert_eq!(s.apply_move(to(50.0, 125.0), &reg).as_slice(), &[leave("A")]);
        assert!(s.hover().is_none());
        assert!(s.apply_move(to(50.0, 130.0), &reg).is_empty());
    }

    #[test]
    fn ineligible_candidate_acts_like_no_candidate() {
        let reg = registry(&["A", "B"]);
        let mut s = session(&["A"]);
        s.apply_move(to(50.0, 50.0), &reg);

        assert_eq!(s.apply_move(to(50.0, 175.0), &reg).as_slice(), &[leave("A")]);
        assert!(s.hover().is_none());
        assert!(s.apply_move(to(50.0, 180.0), &reg).is_empty());
    }

    #[test]
    fn unregistered_candidate_is_not_entered() {
        let mut reg = registry(&["A", "B"]);
        let mut s = session(&["A", "B"]);
        reg.unregister("A");
        assert!(s.apply_move(to(50.0, 50.0), &reg).is_empty());
        assert!(s.hover().is_none());
    }

    #[test]
    fn eligibility_is_fixed_for_the_session() {
        let mut reg = registry(&["A"]);
        let mut s = session(&["A"]);
        reg.register(DropRegistration::new("B", |_: MeasureTicket| {}));
        assert!(!s.is_eligible("B"));
        assert!(s.apply_move(to(50.0, 175.0), &reg).is_empty());
        assert_eq!(s.valid_drop_ids().len(), 1);
    }

    #[test]
    fn default_eligibility_excludes_source() {
        let reg = registry(&["A", "B", "C"]);
        let source = DropTargetId::from("A");
        let valid = DragSession::default_eligibility(&reg, Some(&source));
        let mut ids: Vec<_> = valid.iter().map(DropTargetId::as_str).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["B", "C"]);

        let all = DragSession::default_eligibility(&reg, None);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn origin_is_in_container_space() {
        let frame = ContainerFrame::new(layout_rect(10.0, 20.0, 500.0, 500.0));
        let layout = LayoutSnapshot::new(frame, Vec::<(DropTargetId, Rect)>::new());
        let s = DragSession::new(
            DragId::from("d"),
            Vec::<DropTargetId>::new(),
            layout,
            layout_rect(30.0, 40.0, 10.0, 10.0),
            Vec2::new(5.0, 5.0),
        );
        assert_eq!(s.origin(), layout_rect(20.0, 20.0, 10.0, 10.0));
        assert_eq!(s.current_rect(), layout_rect(25.0, 25.0, 10.0, 10.0));
        assert_eq!(s.center(), Point::new(30.0, 30.0));
    }

    #[test]
    fn finish_reports_drop_or_cancel() {
        let reg = registry(&["A", "B"]);
        let mut s = session(&["A", "B"]);
        s.apply_move(to(50.0, 175.0), &reg);
        assert_eq!(
            s.finish(),
            DragOutcome::Dropped {
                drag_id: "drag".into(),
                target: "B".into(),
            }
        );

        let s = session(&["A", "B"]);
        assert_eq!(
            s.finish(),
            DragOutcome::Cancelled {
                drag_id: "drag".into()
            }
        );
    }

    #[test]
    fn clear_hover_on_only_matches_hovered() {
        let reg = registry(&["A", "B"]);
        let mut s = session(&["A", "B"]);
        s.apply_move(to(50.0, 50.0), &reg);
        assert_eq!(s.clear_hover_on("B"), None);
        assert_eq!(s.clear_hover_on("A"), Some(leave("A")));
        assert_eq!(s.clear_hover_on("A"), None);
        assert!(s.hover().is_none());
    }
}
