// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Drag Drop: drop-target coordination for touch drag and drop.
//!
//! This crate decides, on every pointer movement of a single-pointer drag, whether the dragged
//! content currently overlaps an eligible drop target, and fires enter, leave, and drop
//! notifications when that changes. It does not capture gestures, measure layout, or render
//! anything; those are supplied by the host through narrow interfaces.
//!
//! ## Pieces
//!
//! - [`geometry`]: rectangles and the window → container coordinate-space conversion.
//! - [`registry`]: the [`DropRegistry`] of mounted targets and the asynchronous drag-start
//!   layout snapshot.
//! - [`hit`]: finds the target under the dragged rectangle's center.
//! - [`session`]: the pure hover/drop state machine for one drag.
//! - [`controller`]: the [`DragDropController`] that ties them together, runs consumer
//!   callbacks, and issues [`present`] commands.
//!
//! ## Workflow
//!
//! 1) Drop targets register a [`DropRegistration`] (id, measurement accessor, optional
//!    enter/leave callbacks) with the controller.
//! 2) The gesture layer reports a drag start. The controller requests measurements of the
//!    container and every target; the host answers each [`MeasureTicket`].
//! 3) Once the snapshot is complete, every move is hit tested against it. Eligibility is
//!    fixed at drag start: by default every target except the one the drag came from.
//! 4) At drag end the hovered target, if any, receives the drop.
//!
//! ```rust
//! use core::cell::RefCell;
//! use std::rc::Rc;
//! use kurbo::Vec2;
//! use understory_drag_drop::geometry::layout_rect;
//! use understory_drag_drop::{
//!     DragDropController, DragOutcome, DragStart, DropRegistration, MeasureTicket,
//! };
//!
//! // The host queues measurement requests and answers them on a later turn.
//! let requests: Rc<RefCell<Vec<MeasureTicket>>> = Rc::default();
//! let queue = requests.clone();
//! let container = move |t: MeasureTicket| queue.borrow_mut().push(t);
//! let mut dnd = DragDropController::new(container, (), ());
//!
//! let entered = Rc::new(RefCell::new(Vec::new()));
//! let log = entered.clone();
//! let queue = requests.clone();
//! dnd.register(
//!     DropRegistration::new("trash", move |t: MeasureTicket| queue.borrow_mut().push(t))
//!         .on_enter(move |drag| {
//!             log.borrow_mut().push(drag.to_string());
//!             Ok(())
//!         }),
//! );
//!
//! dnd.drag_start(DragStart::new("file-1", layout_rect(300.0, 300.0, 40.0, 40.0))).unwrap();
//! let tickets: Vec<_> = requests.borrow_mut().drain(..).collect();
//! for ticket in tickets {
//!     let rect = if ticket.is_container() {
//!         layout_rect(0.0, 0.0, 800.0, 600.0)
//!     } else {
//!         layout_rect(0.0, 0.0, 100.0, 100.0)
//!     };
//!     dnd.measured(ticket, rect).unwrap();
//! }
//!
//! // Center moves from (320, 320) to (50, 50).
//! dnd.drag_move(Vec2::new(-270.0, -270.0));
//! assert_eq!(*entered.borrow(), ["file-1"]);
//!
//! let outcome = dnd.drag_end().unwrap();
//! assert_eq!(outcome.target().map(|t| t.as_str()), Some("trash"));
//! assert!(matches!(outcome, DragOutcome::Dropped { .. }));
//! ```
//!
//! ## Known limitation
//!
//! Target rectangles are measured once per drag. If a target moves while a drag is in
//! progress, hit testing keeps using its drag-start rectangle.
//!
//! ## Features
//!
//! - `std` (default): use the standard library; panicking consumer callbacks are caught.
//! - `libm`: floating-point support for `no_std` builds.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod present;
pub mod registry;
pub mod session;

pub use config::DragDropConfig;
pub use controller::{DragDropController, DragDropDelegate, DragStart, GestureEvent};
pub use error::{CallbackError, DragDropError};
pub use id::{DragId, DropTargetId};
pub use present::{PresentationCommand, Presenter};
pub use registry::{DropRegistration, DropRegistry, LayoutSnapshot, Measure, MeasureTicket};
pub use session::{DragOutcome, DragSession, DropEvent};
