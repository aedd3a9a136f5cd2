// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation-layer commands.
//!
//! The controller does not render or animate anything. It tells a [`Presenter`] when to hide
//! the source element, where to draw the floating copy of the dragged content, and how to wind
//! down after a drop or cancellation. All rectangles are in container space.

use alloc::vec::Vec;
use core::time::Duration;

use kurbo::Rect;

use crate::id::DragId;

/// An instruction for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationCommand {
    /// Hide the element the drag was started from.
    HideSource {
        /// The dragged element.
        drag_id: DragId,
    },
    /// Show the floating copy at `rect`.
    ShowFloating {
        /// The dragged element.
        drag_id: DragId,
        /// Where to draw the floating copy.
        rect: Rect,
    },
    /// Move the floating copy to `rect`.
    MoveFloating {
        /// The dragged element.
        drag_id: DragId,
        /// Where to draw the floating copy.
        rect: Rect,
    },
    /// Animate the floating copy back to `origin` over `duration`.
    ReturnToOrigin {
        /// The dragged element.
        drag_id: DragId,
        /// The drag-start rectangle.
        origin: Rect,
        /// Animation length.
        duration: Duration,
    },
    /// Hide the floating copy after `delay`.
    HideFloating {
        /// The dragged element.
        drag_id: DragId,
        /// Time to wait before hiding.
        delay: Duration,
    },
    /// Reveal the source element again after `delay`.
    ShowSource {
        /// The dragged element.
        drag_id: DragId,
        /// Time to wait before revealing.
        delay: Duration,
    },
}

impl PresentationCommand {
    /// The drag this command belongs to.
    #[must_use]
    pub fn drag_id(&self) -> &DragId {
        match self {
            Self::HideSource { drag_id }
            | Self::ShowFloating { drag_id, .. }
            | Self::MoveFloating { drag_id, .. }
            | Self::ReturnToOrigin { drag_id, .. }
            | Self::HideFloating { drag_id, .. }
            | Self::ShowSource { drag_id, .. } => drag_id,
        }
    }
}

/// Receives presentation commands.
pub trait Presenter {
    /// Apply or schedule `command`.
    fn present(&mut self, command: PresentationCommand);
}

/// Discards every command.
impl Presenter for () {
    #[inline]
    fn present(&mut self, _command: PresentationCommand) {}
}

/// Records commands in order.
impl Presenter for Vec<PresentationCommand> {
    fn present(&mut self, command: PresentationCommand) {
        self.push(command);
    }
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn present(&mut self, command: PresentationCommand) {
        (**self).present(command);
    }
}
