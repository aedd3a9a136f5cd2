// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only misuse of the controller API is surfaced as [`DragDropError`]. Everything the
//! coordination layer can recover from on its own (a consumer callback failing, a target
//! vanishing between enter and leave, a degenerate measurement, a duplicate id) is absorbed
//! and logged instead.

use alloc::borrow::Cow;
use alloc::string::String;

use crate::id::DragId;
use crate::registry::MeasureTicket;

/// Errors returned by [`DragDropController`](crate::DragDropController) inputs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DragDropError {
    /// A drag start arrived while another drag was still in progress.
    #[error("drag {active} is already in progress")]
    DragInProgress {
        /// The drag that owns the current session.
        active: DragId,
    },
    /// A measurement answered a ticket the controller is not waiting for.
    ///
    /// This happens for late answers belonging to an earlier drag, or for a ticket that was
    /// already resolved.
    #[error("measurement ticket {0:?} is not pending")]
    UnknownTicket(MeasureTicket),
}

/// Failure reported by a consumer-supplied callback.
///
/// Callback failures never abort a transition; they are logged and otherwise ignored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: Cow<'static, str>,
}

impl CallbackError {
    /// Create an error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&'static str> for CallbackError {
    fn from(message: &'static str) -> Self {
        Self::new(message)
    }
}
