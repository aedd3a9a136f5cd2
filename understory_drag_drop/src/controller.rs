// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag-and-drop controller.
//!
//! [`DragDropController`] is handed, by reference, to the components that take part in drag
//! and drop: drop targets register and unregister through it, and the gesture layer forwards
//! drag start, move, and end signals to it. It owns the [`DropRegistry`], the container's
//! [`Measure`], the current [`DragSession`], a [`DragDropDelegate`] for container-level
//! notifications, and a [`Presenter`] for the floating copy.
//!
//! ## Lifecycle
//!
//! 1. [`drag_start`](DragDropController::drag_start) issues measurement tickets for the
//!    container and every registered target.
//! 2. The host answers each ticket with [`measured`](DragDropController::measured). Once all
//!    are in, the session becomes active: eligibility is computed, the delegate hears
//!    `drag_did_start`, and the presenter hides the source and shows the floating copy.
//! 3. Each [`drag_move`](DragDropController::drag_move) moves the floating copy and applies
//!    the hover transition policy, firing target enter/leave callbacks.
//! 4. [`drag_end`](DragDropController::drag_end) drops onto the hovered target (drop
//!    notification, then its leave) or cancels, and returns the [`DragOutcome`].
//!
//! Moves that arrive while measurements are outstanding only update the latest translation;
//! it is evaluated once the snapshot completes. Ending a drag before that cancels it.
//!
//! ## Failure isolation
//!
//! Consumer callbacks are best effort. A callback that returns an error (or, with the `std`
//! feature, panics) is logged and skipped; the transition it belonged to still completes.
//! A leave is delivered through the callback captured when the hover began, so a target that
//! unmounted or re-registered in between still gets the leave matching its enter.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::mem;
use core::time::Duration;

use kurbo::{Rect, Vec2};

use crate::config::DragDropConfig;
use crate::error::{CallbackError, DragDropError};
use crate::id::{DragId, DropTargetId};
use crate::present::{PresentationCommand, Presenter};
use crate::registry::{
    DropRegistration, DropRegistry, LayoutSnapshot, LeaveCallback, Measure, MeasureTicket,
    PendingSnapshot,
};
use crate::session::{DragOutcome, DragSession, DropEvent, DropEvents};

/// Container-level notifications.
///
/// Every method has a no-op default; `()` implements the trait with all defaults.
pub trait DragDropDelegate {
    /// Override eligibility for `drag_id`.
    ///
    /// Return `None` to use the default: every registered target except the one the drag
    /// originated from. A returned list is used verbatim; ids that are not registered are
    /// harmless.
    fn valid_drop_ids(&mut self, drag_id: &DragId) -> Option<Vec<DropTargetId>> {
        let _ = drag_id;
        None
    }

    /// A drag became active.
    fn drag_did_start(&mut self, drag_id: &DragId) -> Result<(), CallbackError> {
        let _ = drag_id;
        Ok(())
    }

    /// The dragged rectangle moved to `rect` (container space).
    fn drag_did_move(&mut self, drag_id: &DragId, rect: Rect) -> Result<(), CallbackError> {
        let _ = (drag_id, rect);
        Ok(())
    }

    /// The hovered target changed.
    fn drop_hover_changed(
        &mut self,
        drag_id: &DragId,
        target: Option<&DropTargetId>,
    ) -> Result<(), CallbackError> {
        let _ = (drag_id, target);
        Ok(())
    }

    /// `drag_id` was dropped on `target`.
    fn did_drop(&mut self, drag_id: &DragId, target: &DropTargetId) -> Result<(), CallbackError> {
        let _ = (drag_id, target);
        Ok(())
    }
}

impl DragDropDelegate for () {}

/// Drag-start signal from the gesture layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DragStart {
    /// The dragged element.
    pub drag_id: DragId,
    /// The drop target the drag originated from, if any.
    pub source: Option<DropTargetId>,
    /// The dragged content's rectangle, in window space.
    pub rect: Rect,
    /// Gesture translation at the time the drag was recognized.
    pub translation: Vec2,
}

impl DragStart {
    /// A drag of `drag_id` whose content occupies `rect` (window space).
    pub fn new(drag_id: impl Into<DragId>, rect: Rect) -> Self {
        Self {
            drag_id: drag_id.into(),
            source: None,
            rect,
            translation: Vec2::ZERO,
        }
    }

    /// Mark the drag as originating from drop target `source`.
    #[must_use]
    pub fn from_target(mut self, source: impl Into<DropTargetId>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the initial gesture translation.
    #[must_use]
    pub fn with_translation(mut self, translation: Vec2) -> Self {
        self.translation = translation;
        self
    }
}

/// Gesture signals, for hosts that forward them through an ordered channel.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// See [`DragDropController::drag_start`].
    Start(DragStart),
    /// See [`DragDropController::drag_move`].
    Move(Vec2),
    /// See [`DragDropController::drag_end`].
    End,
}

enum Phase {
    Idle,
    Measuring {
        start: DragStart,
        pending: PendingSnapshot,
        latest: Option<Vec2>,
    },
    Dragging {
        session: DragSession,
        // Leave callback of the hovered target, captured at enter.
        hover_leave: Option<LeaveCallback>,
    },
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Measuring { .. } => "Measuring",
            Self::Dragging { .. } => "Dragging",
        }
    }
}

/// Coordinates drop-target registration and a single-pointer drag.
pub struct DragDropController<D = (), P = ()> {
    registry: DropRegistry,
    container: Box<dyn Measure>,
    delegate: D,
    presenter: P,
    config: DragDropConfig,
    phase: Phase,
    epoch: u32,
}

impl<D, P> fmt::Debug for DragDropController<D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDropController")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("phase", &self.phase.name())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<D: DragDropDelegate, P: Presenter> DragDropController<D, P> {
    /// Create a controller.
    ///
    /// `container` measures the drag-drop surface itself, in window space.
    pub fn new(container: impl Measure + 'static, delegate: D, presenter: P) -> Self {
        Self {
            registry: DropRegistry::new(),
            container: Box::new(container),
            delegate,
            presenter,
            config: DragDropConfig::default(),
            phase: Phase::Idle,
            epoch: 0,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DragDropConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &DragDropConfig {
        &self.config
    }

    /// The drop-target registry.
    pub fn registry(&self) -> &DropRegistry {
        &self.registry
    }

    /// The delegate.
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// The delegate, mutably.
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// The presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// The presenter, mutably.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// The active session, once the drag-start snapshot is complete.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Returns `true` from drag start until drag end, including while measuring.
    pub fn is_dragging(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Returns `true` while drag-start measurements are outstanding.
    pub fn is_measuring(&self) -> bool {
        matches!(self.phase, Phase::Measuring { .. })
    }

    /// The hovered target, if any.
    pub fn hover(&self) -> Option<&DropTargetId> {
        self.session().and_then(DragSession::hover)
    }

    /// Register a drop target; an existing registration with the same id is replaced.
    pub fn register(&mut self, registration: DropRegistration) {
        self.registry.register(registration);
    }

    /// Unregister a drop target. No-op if it is not registered.
    ///
    /// If the target is hovered, the hover ends now and its captured leave callback fires. If
    /// its drag-start measurement is still outstanding, the drag stops waiting for it.
    pub fn unregister(&mut self, id: &str) {
        self.registry.unregister(id);
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Measuring { pending, .. } => {
                if pending.forget(id) {
                    tracing::debug!(drop_target = id, "unmounted before measurement");
                    self.finish_measuring();
                }
            }
            Phase::Dragging {
                session,
                hover_leave,
            } => {
                if let Some(event) = session.clear_hover_on(id) {
                    tracing::debug!(
                        drag = %session.drag_id(),
                        drop_target = id,
                        "hovered drop target unregistered"
                    );
                    let events: DropEvents = [event].into_iter().collect();
                    deliver(session, hover_leave, events, &self.registry, &mut self.delegate);
                }
            }
        }
    }

    /// Handle a drag-start signal.
    ///
    /// Issues measurement tickets for the container and every registered target; the drag
    /// becomes active once all of them are answered through [`measured`](Self::measured).
    pub fn drag_start(&mut self, start: DragStart) -> Result<(), DragDropError> {
        match &self.phase {
            Phase::Idle => {}
            Phase::Measuring { start: active, .. } => {
                return Err(DragDropError::DragInProgress {
                    active: active.drag_id.clone(),
                });
            }
            Phase::Dragging { session, .. } => {
                return Err(DragDropError::DragInProgress {
                    active: session.drag_id().clone(),
                });
            }
        }
        self.epoch = self.epoch.wrapping_add(1);
        tracing::debug!(
            drag = %start.drag_id,
            epoch = self.epoch,
            targets = self.registry.len(),
            "drag start, measuring layout"
        );
        let pending = self.registry.snapshot_all(self.epoch, &*self.container);
        self.phase = Phase::Measuring {
            start,
            pending,
            latest: None,
        };
        Ok(())
    }

    /// Deliver a measurement answer.
    ///
    /// Completing the drag-start snapshot activates the session.
    pub fn measured(&mut self, ticket: MeasureTicket, rect: Rect) -> Result<(), DragDropError> {
        let Phase::Measuring { pending, .. } = &mut self.phase else {
            return Err(DragDropError::UnknownTicket(ticket));
        };
        if pending.resolve(ticket, rect)? {
            self.finish_measuring();
        }
        Ok(())
    }

    /// Handle a move signal; `translation` is the gesture's total translation.
    pub fn drag_move(&mut self, translation: Vec2) {
        let (session, hover_leave) = match &mut self.phase {
            Phase::Idle => {
                tracing::trace!(?translation, "move without a drag");
                return;
            }
            Phase::Measuring { latest, .. } => {
                *latest = Some(translation);
                return;
            }
            Phase::Dragging {
                session,
                hover_leave,
            } => (session, hover_leave),
        };
        let events = session.apply_move(translation, &self.registry);
        let rect = session.current_rect();
        self.presenter.present(PresentationCommand::MoveFloating {
            drag_id: session.drag_id().clone(),
            rect,
        });
        invoke("drag_did_move", || {
            self.delegate.drag_did_move(session.drag_id(), rect)
        });
        deliver(session, hover_leave, events, &self.registry, &mut self.delegate);
    }

    /// Handle a drag-end signal.
    ///
    /// Returns `None` if no drag was in progress.
    pub fn drag_end(&mut self) -> Option<DragOutcome> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Measuring { start, .. } => {
                tracing::debug!(drag = %start.drag_id, "drag ended before layout was measured");
                Some(DragOutcome::Cancelled {
                    drag_id: start.drag_id,
                })
            }
            Phase::Dragging {
                session,
                hover_leave,
            } => {
                let origin = session.origin();
                let outcome = session.finish();
                self.complete(&outcome, origin, hover_leave);
                Some(outcome)
            }
        }
    }

    /// Dispatch a gesture signal.
    pub fn handle(&mut self, event: GestureEvent) -> Result<Option<DragOutcome>, DragDropError> {
        match event {
            GestureEvent::Start(start) => self.drag_start(start).map(|()| None),
            GestureEvent::Move(translation) => {
                self.drag_move(translation);
                Ok(None)
            }
            GestureEvent::End => Ok(self.drag_end()),
        }
    }

    // Activate the session from a complete drag-start snapshot.
    fn finish_measuring(&mut self) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Measuring {
                start,
                pending,
                latest,
            } => match pending.finish() {
                Ok(layout) => self.activate(start, layout, latest),
                Err(pending) => {
                    self.phase = Phase::Measuring {
                        start,
                        pending,
                        latest,
                    };
                }
            },
            other => self.phase = other,
        }
    }

    fn activate(
        &mut self,
        start: DragStart,
        layout: LayoutSnapshot,
        latest: Option<Vec2>,
    ) {
        let drag_id = start.drag_id;
        let valid: Vec<DropTargetId> = match invoke("valid_drop_ids", || {
            Ok(self.delegate.valid_drop_ids(&drag_id))
        }) {
            Some(Some(ids)) => ids,
            Some(None) => DragSession::default_eligibility(&self.registry, start.source.as_ref())
                .into_iter()
                .collect(),
            None => Vec::new(),
        };
        let session = DragSession::new(drag_id, valid, layout, start.rect, start.translation);
        tracing::debug!(
            drag = %session.drag_id(),
            eligible = session.valid_drop_ids().len(),
            "drag active"
        );

        invoke("drag_did_start", || {
            self.delegate.drag_did_start(session.drag_id())
        });
        self.presenter.present(PresentationCommand::HideSource {
            drag_id: session.drag_id().clone(),
        });
        self.presenter.present(PresentationCommand::ShowFloating {
            drag_id: session.drag_id().clone(),
            rect: session.current_rect(),
        });

        self.phase = Phase::Dragging {
            session,
            hover_leave: None,
        };
        if let Some(translation) = latest {
            self.drag_move(translation);
        }
    }

    fn complete(&mut self, outcome: &DragOutcome, origin: Rect, hover_leave: Option<LeaveCallback>) {
        let drag_id = outcome.drag_id().clone();
        match outcome {
            DragOutcome::Dropped { drag_id, target } => {
                tracing::debug!(drag = %drag_id, drop_target = %target, "drop");
                invoke("did_drop", || self.delegate.did_drop(drag_id, target));
                if let Some(leave) = hover_leave {
                    invoke("on_leave", || leave());
                }
                invoke("drop_hover_changed", || {
                    self.delegate.drop_hover_changed(drag_id, None)
                });
                self.presenter.present(PresentationCommand::HideFloating {
                    drag_id: drag_id.clone(),
                    delay: Duration::ZERO,
                });
                self.presenter.present(PresentationCommand::ShowSource {
                    drag_id: drag_id.clone(),
                    delay: self.config.drop_reveal_delay,
                });
            }
            DragOutcome::Cancelled { .. } => {
                tracing::debug!(drag = %drag_id, "drag cancelled");
                let duration = self.config.cancel_return_duration;
                self.presenter.present(PresentationCommand::ReturnToOrigin {
                    drag_id: drag_id.clone(),
                    origin,
                    duration,
                });
                self.presenter.present(PresentationCommand::HideFloating {
                    drag_id: drag_id.clone(),
                    delay: duration,
                });
                self.presenter
                    .present(PresentationCommand::ShowSource { drag_id, delay: duration });
            }
        }
    }
}

// Fire target callbacks for `events`, then tell the delegate about the new hover.
fn deliver<D: DragDropDelegate>(
    session: &DragSession,
    hover_leave: &mut Option<LeaveCallback>,
    events: DropEvents,
    registry: &DropRegistry,
    delegate: &mut D,
) {
    if events.is_empty() {
        return;
    }
    let drag_id = session.drag_id();
    for event in events {
        match event {
            DropEvent::Leave(target) => {
                tracing::debug!(drag = %drag_id, drop_target = %target, "drag leave");
                if let Some(leave) = hover_leave.take() {
                    invoke("on_leave", || leave());
                }
            }
            DropEvent::Enter(target) => {
                tracing::debug!(drag = %drag_id, drop_target = %target, "drag enter");
                let Some(registration) = registry.lookup(target.as_str()) else {
                    tracing::debug!(
                        drop_target = %target,
                        "entered drop target has no registration"
                    );
                    continue;
                };
                *hover_leave = registration.leave_callback().cloned();
                if let Some(enter) = registration.enter_callback() {
                    invoke("on_enter", || enter(drag_id));
                }
            }
        }
    }
    invoke("drop_hover_changed", || {
        delegate.drop_hover_changed(drag_id, session.hover())
    });
}

// Run a consumer callback, absorbing its failure.
fn invoke<T>(callback: &'static str, f: impl FnOnce() -> Result<T, CallbackError>) -> Option<T> {
    #[cfg(feature = "std")]
    let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(callback, "consumer callback panicked");
            return None;
        }
    };
    #[cfg(not(feature = "std"))]
    let result = f();

    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(callback, %error, "consumer callback failed");
            None
        }
    }
}
