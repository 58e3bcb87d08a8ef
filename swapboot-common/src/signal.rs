// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Completion signal shared between the protocol layer and the supervisor.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-writer/single-reader flag raised by protocol-layer request handling
/// and observed by the session supervisor.
///
/// The writer runs inside `Transport::service_once`, on the same thread as the
/// reader. Release/acquire ordering keeps the handoff valid if the transport
/// is ever moved to a real interrupt handler. Only `load`/`store` are used, so
/// this works on cores without compare-and-swap (thumbv6m).
#[derive(Debug, Default)]
pub struct CompletionSignal {
    raised: AtomicBool,
}

impl CompletionSignal {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Request the session to end. Called by the protocol layer only.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}
