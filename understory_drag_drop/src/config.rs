// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller configuration.

use core::time::Duration;

/// Timing parameters forwarded to the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DragDropConfig {
    /// Delay before the source element reappears after a drop.
    pub drop_reveal_delay: Duration,
    /// Length of the return-to-origin animation after a cancellation.
    ///
    /// The source element reappears, and the floating copy is hidden, once it finishes.
    pub cancel_return_duration: Duration,
}

impl Default for DragDropConfig {
    fn default() -> Self {
        Self {
            drop_reveal_delay: Duration::from_millis(10),
            cancel_return_duration: Duration::from_millis(300),
        }
    }
}
