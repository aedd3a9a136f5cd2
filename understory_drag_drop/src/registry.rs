// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drop-target registry and the drag-start layout snapshot.
//!
//! ## Registration
//!
//! Targets register a [`DropRegistration`] when they mount and unregister when they unmount.
//! Registering an id that is already present replaces the old registration in place: the last
//! registration wins and keeps the original position in registration order. This tolerates
//! re-render churn where a target re-registers with fresh callbacks.
//!
//! ## Measurement
//!
//! On-screen rectangles come from the host renderer and arrive asynchronously. A [`Measure`]
//! implementation is handed a [`MeasureTicket`]; the host answers later with that ticket and
//! the window-space rectangle. [`DropRegistry::snapshot_all`] issues one ticket for the
//! container and one per registered target, returning a [`PendingSnapshot`] that accepts the
//! answers in any order and only yields a [`LayoutSnapshot`] once every ticket has settled.
//!
//! ```
//! use core::cell::RefCell;
//! use std::rc::Rc;
//! use understory_drag_drop::geometry::layout_rect;
//! use understory_drag_drop::registry::{DropRegistration, DropRegistry, MeasureTicket};
//!
//! let requests: Rc<RefCell<Vec<MeasureTicket>>> = Rc::default();
//! let sink = requests.clone();
//! let mut registry = DropRegistry::new();
//! registry.register(DropRegistration::new("a", move |t| sink.borrow_mut().push(t)));
//!
//! let container_requests = requests.clone();
//! let container = move |t| container_requests.borrow_mut().push(t);
//! let mut pending = registry.snapshot_all(1, &container);
//! let tickets = requests.borrow().clone();
//! assert_eq!(tickets.len(), 2);
//!
//! pending.resolve(tickets[1], layout_rect(0.0, 0.0, 50.0, 50.0)).unwrap();
//! assert!(!pending.is_complete());
//! pending.resolve(tickets[0], layout_rect(0.0, 0.0, 400.0, 400.0)).unwrap();
//! let snapshot = pending.finish().unwrap();
//! assert_eq!(snapshot.len(), 1);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::error::{CallbackError, DragDropError};
use crate::geometry::{ContainerFrame, is_degenerate};
use crate::id::{DragId, DropTargetId};

/// Callback fired when an eligible drag starts hovering a target.
pub type EnterCallback = Rc<dyn Fn(&DragId) -> Result<(), CallbackError>>;

/// Callback fired when a hover on a target ends.
pub type LeaveCallback = Rc<dyn Fn() -> Result<(), CallbackError>>;

/// Asynchronous layout measurement.
///
/// Implementations forward the request to the host renderer. The result must be delivered
/// later, together with `ticket`, through
/// [`DragDropController::measured`](crate::DragDropController::measured) (or
/// [`PendingSnapshot::resolve`] when driving a snapshot by hand). Exactly one answer is
/// expected per ticket, in window space.
pub trait Measure {
    /// Request the on-screen rectangle of the measured element.
    fn measure(&self, ticket: MeasureTicket);
}

impl<F: Fn(MeasureTicket)> Measure for F {
    fn measure(&self, ticket: MeasureTicket) {
        self(ticket);
    }
}

/// Correlates an asynchronous measurement answer with its request.
///
/// The epoch identifies the drag the request belongs to; answers for an older epoch are
/// rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeasureTicket {
    epoch: u32,
    slot: u32,
}

impl MeasureTicket {
    /// Slot reserved for the container frame.
    const CONTAINER: u32 = 0;

    /// The drag epoch this ticket was issued for.
    #[must_use]
    pub const fn epoch(self) -> u32 {
        self.epoch
    }

    /// Returns `true` if this ticket asks for the container frame.
    #[must_use]
    pub const fn is_container(self) -> bool {
        self.slot == Self::CONTAINER
    }
}

/// A mounted drop target.
pub struct DropRegistration {
    id: DropTargetId,
    measure: Rc<dyn Measure>,
    on_enter: Option<EnterCallback>,
    on_leave: Option<LeaveCallback>,
}

impl DropRegistration {
    /// Create a registration with no enter/leave callbacks.
    pub fn new(id: impl Into<DropTargetId>, measure: impl Measure + 'static) -> Self {
        Self {
            id: id.into(),
            measure: Rc::new(measure),
            on_enter: None,
            on_leave: None,
        }
    }

    /// Set the callback fired when an eligible drag enters this target.
    #[must_use]
    pub fn on_enter(
        mut self,
        callback: impl Fn(&DragId) -> Result<(), CallbackError> + 'static,
    ) -> Self {
        self.on_enter = Some(Rc::new(callback));
        self
    }

    /// Set the callback fired when a hover on this target ends.
    #[must_use]
    pub fn on_leave(mut self, callback: impl Fn() -> Result<(), CallbackError> + 'static) -> Self {
        self.on_leave = Some(Rc::new(callback));
        self
    }

    /// The target's identifier.
    #[must_use]
    pub fn id(&self) -> &DropTargetId {
        &self.id
    }

    /// The enter callback, if any.
    #[must_use]
    pub fn enter_callback(&self) -> Option<&EnterCallback> {
        self.on_enter.as_ref()
    }

    /// The leave callback, if any.
    ///
    /// Cloning the handle keeps it callable after the registration is gone.
    #[must_use]
    pub fn leave_callback(&self) -> Option<&LeaveCallback> {
        self.on_leave.as_ref()
    }

    /// The measurement accessor.
    #[must_use]
    pub fn measurer(&self) -> &dyn Measure {
        &*self.measure
    }
}

impl fmt::Debug for DropRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropRegistration")
            .field("id", &self.id)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .finish_non_exhaustive()
    }
}

/// Registered drop targets, in registration order.
#[derive(Default)]
pub struct DropRegistry {
    slots: Vec<Option<DropRegistration>>,
    index: HashMap<DropTargetId, usize>,
}

impl DropRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a registration, replacing any existing one with the same id.
    ///
    /// Returns the replaced registration, if there was one.
    pub fn register(&mut self, registration: DropRegistration) -> Option<DropRegistration> {
        if let Some(&slot) = self.index.get(&registration.id) {
            tracing::debug!(id = %registration.id, "replacing drop target registration");
            return self.slots[slot].replace(registration);
        }
        self.index.insert(registration.id.clone(), self.slots.len());
        self.slots.push(Some(registration));
        None
    }

    /// Remove a registration. No-op if `id` is not registered.
    pub fn unregister(&mut self, id: &str) -> Option<DropRegistration> {
        let slot = self.index.remove(id)?;
        let removed = self.slots[slot].take();
        self.maybe_compact();
        removed
    }

    /// Look up a registration by id.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&DropRegistration> {
        let slot = *self.index.get(id)?;
        self.slots[slot].as_ref()
    }

    /// Returns `true` if `id` is currently registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no targets are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &DropTargetId> + '_ {
        self.iter().map(DropRegistration::id)
    }

    /// Registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DropRegistration> + '_ {
        self.slots.iter().flatten()
    }

    /// Measure the container and every registered target.
    ///
    /// The container ticket is issued first, then one ticket per target in registration order.
    /// Targets registered after this call are not part of the snapshot.
    pub fn snapshot_all(&self, epoch: u32, container: &dyn Measure) -> PendingSnapshot {
        let targets: Vec<_> = self.ids().map(|id| (id.clone(), Answer::Pending)).collect();
        let pending = PendingSnapshot {
            epoch,
            frame: None,
            outstanding: targets.len() + 1,
            targets,
        };
        container.measure(MeasureTicket {
            epoch,
            slot: MeasureTicket::CONTAINER,
        });
        for (i, registration) in self.iter().enumerate() {
            let slot = u32::try_from(i + 1).unwrap_or(u32::MAX);
            registration.measurer().measure(MeasureTicket { epoch, slot });
        }
        pending
    }

    // Tombstones are left behind by `unregister`; squeeze them out once they dominate.
    fn maybe_compact(&mut self) {
        if self.slots.len() < 16 || self.index.len() * 2 > self.slots.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        self.index.clear();
        for (slot, registration) in self.slots.iter().enumerate() {
            if let Some(registration) = registration {
                self.index.insert(registration.id.clone(), slot);
            }
        }
    }
}

impl fmt::Debug for DropRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropRegistry")
            .field("total_slots", &self.slots.len())
            .field("alive", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// A layout snapshot still waiting for measurement answers.
#[derive(Clone, Debug)]
pub struct PendingSnapshot {
    epoch: u32,
    frame: Option<ContainerFrame>,
    targets: Vec<(DropTargetId, Answer)>,
    outstanding: usize,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Answer {
    Pending,
    Measured(Rect),
    // Unmounted before it was measured; left out of the snapshot.
    Forgotten,
}

impl PendingSnapshot {
    /// The drag epoch the snapshot was issued for.
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Returns `true` once every ticket has been answered.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outstanding == 0
    }

    /// Record the answer for `ticket`.
    ///
    /// Returns `Ok(true)` when this answer completed the snapshot.
    pub fn resolve(&mut self, ticket: MeasureTicket, rect: Rect) -> Result<bool, DragDropError> {
        if ticket.epoch != self.epoch {
            return Err(DragDropError::UnknownTicket(ticket));
        }
        if ticket.is_container() {
            if self.frame.is_some() {
                return Err(DragDropError::UnknownTicket(ticket));
            }
            self.frame = Some(ContainerFrame::new(rect));
        } else {
            let entry = (ticket.slot as usize)
                .checked_sub(1)
                .and_then(|i| self.targets.get_mut(i))
                .ok_or(DragDropError::UnknownTicket(ticket))?;
            if entry.1 != Answer::Pending {
                return Err(DragDropError::UnknownTicket(ticket));
            }
            if is_degenerate(rect) {
                tracing::debug!(id = %entry.0, ?rect, "degenerate drop target rectangle");
            }
            entry.1 = Answer::Measured(rect);
        }
        self.outstanding -= 1;
        Ok(self.outstanding == 0)
    }

    /// Stop waiting for target `id`, which will never be measured.
    ///
    /// The target is left out of the finished snapshot and a later answer for its ticket is
    /// rejected. Returns `true` when this completed the snapshot; `false` if `id` was not
    /// waiting for an answer.
    pub fn forget(&mut self, id: &str) -> bool {
        let Some(entry) = self
            .targets
            .iter_mut()
            .find(|(target, answer)| *answer == Answer::Pending && target.as_str() == id)
        else {
            return false;
        };
        entry.1 = Answer::Forgotten;
        self.outstanding -= 1;
        self.outstanding == 0
    }

    /// Turn a complete snapshot into a [`LayoutSnapshot`].
    ///
    /// Returns `Err(self)` while answers are still outstanding.
    pub fn finish(self) -> Result<LayoutSnapshot, Self> {
        if !self.is_complete() {
            return Err(self);
        }
        let Some(frame) = self.frame else {
            return Err(self);
        };
        let targets = self
            .targets
            .into_iter()
            .filter_map(|(id, answer)| match answer {
                Answer::Measured(rect) => Some((id, rect)),
                Answer::Pending | Answer::Forgotten => None,
            })
            .collect();
        Ok(LayoutSnapshot { frame, targets })
    }
}

/// Container frame and window-space target rectangles captured at drag start.
///
/// Targets are kept in registration order, which is the hit-test tie-break order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSnapshot {
    frame: ContainerFrame,
    targets: Vec<(DropTargetId, Rect)>,
}

impl LayoutSnapshot {
    /// Build a snapshot from already-known rectangles.
    pub fn new(
        frame: ContainerFrame,
        targets: impl IntoIterator<Item = (DropTargetId, Rect)>,
    ) -> Self {
        Self {
            frame,
            targets: targets.into_iter().collect(),
        }
    }

    /// The container frame.
    #[must_use]
    pub const fn frame(&self) -> &ContainerFrame {
        &self.frame
    }

    /// Window-space target rectangles in registration order.
    pub fn targets(&self) -> impl Iterator<Item = (&DropTargetId, Rect)> + '_ {
        self.targets.iter().map(|(id, rect)| (id, *rect))
    }

    /// The captured rectangle for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Rect> {
        self.targets
            .iter()
            .find(|(target, _)| target.as_str() == id)
            .map(|(_, rect)| *rect)
    }

    /// Number of captured targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no targets were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::layout_rect;
    use alloc::vec;
    use core::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<MeasureTicket>>>, impl Measure + Clone + 'static) {
        let log: Rc<RefCell<Vec<MeasureTicket>>> = Rc::default();
        let sink = log.clone();
        (log, move |t: MeasureTicket| sink.borrow_mut().push(t))
    }

    fn noop() -> impl Measure + 'static {
        |_: MeasureTicket| {}
    }

    fn ids(registry: &DropRegistry) -> Vec<&str> {
        registry.ids().map(DropTargetId::as_str).collect()
    }

    #[test]
    fn register_lookup_unregister() {
        let mut registry = DropRegistry::new();
        registry.register(DropRegistration::new("a", noop()));
        registry.register(DropRegistration::new("b", noop()));
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("a").is_some());

        assert!(registry.unregister("a").is_some());
        assert!(registry.lookup("a").is_none());
        assert!(!registry.contains("a"));
        assert_eq!(ids(&registry), vec!["b"]);

        // Absent ids are a no-op.
        assert!(registry.unregister("a").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_replaces_in_place() {
        let mut registry = DropRegistry::new();
        registry.register(DropRegistration::new("a", noop()));
        registry.register(DropRegistration::new("b", noop()));
        let old = registry.register(DropRegistration::new("a", noop()).on_leave(|| Ok(())));

        assert!(old.is_some_and(|r| r.leave_callback().is_none()));
        assert_eq!(registry.len(), 2);
        assert_eq!(ids(&registry), vec!["a", "b"]);
        assert!(
            registry
                .lookup("a")
                .is_some_and(|r| r.leave_callback().is_some())
        );
    }

    #[test]
    fn compaction_keeps_order_and_lookups() {
        let mut registry = DropRegistry::new();
        let names: Vec<_> = (0..20).map(|i| alloc::format!("t{i}")).collect();
        for name in &names {
            registry.register(DropRegistration::new(name.as_str(), noop()));
        }
        for name in names.iter().take(15) {
            registry.unregister(name);
        }
        assert_eq!(ids(&registry), vec!["t15", "t16", "t17", "t18", "t19"]);
        assert!(registry.lookup("t17").is_some());
        registry.unregister("t17");
        assert_eq!(ids(&registry), vec!["t15", "t16", "t18", "t19"]);
    }

    #[test]
    fn snapshot_waits_for_every_answer() {
        let (log, measure) = recorder();
        let mut registry = DropRegistry::new();
        registry.register(DropRegistration::new("a", measure.clone()));
        registry.register(DropRegistration::new("b", measure.clone()));

        let mut pending = registry.snapshot_all(3, &measure);
        let tickets = log.borrow().clone();
        assert_eq!(tickets.len(), 3);
        assert!(tickets[0].is_container());
        assert!(tickets.iter().all(|t| t.epoch() == 3));

        assert_eq!(pending.resolve(tickets[2], layout_rect(0.0, 150.0, 100.0, 100.0)), Ok(false));
        assert_eq!(pending.resolve(tickets[0], layout_rect(10.0, 10.0, 500.0, 500.0)), Ok(false));
        let mut pending = pending.finish().unwrap_err();
        assert_eq!(pending.resolve(tickets[1], layout_rect(0.0, 0.0, 100.0, 100.0)), Ok(true));

        let snapshot = pending.finish().unwrap();
        assert_eq!(snapshot.frame().rect(), layout_rect(10.0, 10.0, 500.0, 500.0));
        let order: Vec<_> = snapshot.targets().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(snapshot.get("b"), Some(layout_rect(0.0, 150.0, 100.0, 100.0)));
    }

    #[test]
    fn stale_and_repeated_answers_are_rejected() {
        let (log, measure) = recorder();
        let mut registry = DropRegistry::new();
        registry.register(DropRegistration::new("a", measure.clone()));

        let _old = registry.snapshot_all(1, &measure);
        let stale = log.borrow()[1];
        let mut pending = registry.snapshot_all(2, &measure);
        let fresh = log.borrow()[3];

        let r = layout_rect(0.0, 0.0, 1.0, 1.0);
        assert_eq!(pending.resolve(stale, r), Err(DragDropError::UnknownTicket(stale)));
        assert_eq!(pending.resolve(fresh, r), Ok(false));
        assert_eq!(pending.resolve(fresh, r), Err(DragDropError::UnknownTicket(fresh)));
    }

    #[test]
    fn forgotten_target_settles_its_ticket() {
        let (log, measure) = recorder();
        let mut registry = DropRegistry::new();
        registry.register(DropRegistration::new("a", measure.clone()));
        registry.register(DropRegistration::new("b", measure.clone()));

        let mut pending = registry.snapshot_all(4, &measure);
        let tickets = log.borrow().clone();
        let r = layout_rect(0.0, 0.0, 100.0, 100.0);
        assert_eq!(pending.resolve(tickets[0], r), Ok(false));
        assert_eq!(pending.resolve(tickets[1], r), Ok(false));

        assert!(!pending.forget("missing"));
        assert!(pending.forget("b"));
        assert!(pending.is_complete());
        // Already settled.
        assert!(!pending.forget("b"));
        assert_eq!(
            pending.resolve(tickets[2], r),
            Err(DragDropError::UnknownTicket(tickets[2]))
        );

        let snapshot = pending.finish().unwrap();
        let order: Vec<_> = snapshot.targets().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["a"]);
    }

    #[test]
    fn empty_registry_snapshot_needs_only_the_container() {
        let (log, measure) = recorder();
        let registry = DropRegistry::new();
        let mut pending = registry.snapshot_all(9, &measure);
        let ticket = log.borrow()[0];
        assert_eq!(pending.resolve(ticket, layout_rect(0.0, 0.0, 10.0, 10.0)), Ok(true));
        assert!(pending.finish().is_ok_and(|s| s.is_empty()));
    }
}
