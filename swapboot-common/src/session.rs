// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Update session supervisor.
//!
//! The supervisor brings the transport up and then services it from a plain
//! loop. The transport's interrupt routine is called synchronously through
//! [`Transport::service_once`], so the whole session runs on one thread and
//! the completion signal needs no locking. The exit conditions are only
//! observed between two service calls.
//!
//! ```text
//! Idle --start()--> Starting --> Running --hold released--> Exiting(HoldReleased)
//!                                        \--signal raised--> Exiting(Completed)
//! ```

use crate::hw::HoldSignal;
use crate::signal::CompletionSignal;

/// Transport lifecycle. `service_once` stands in for the transport interrupt.
pub trait Transport {
    /// Open the transport with its device descriptor and request handler.
    fn open(&mut self);
    /// Start the transport (attach to the bus).
    fn start(&mut self);
    /// Service one unit of transport work.
    fn service_once(&mut self);
}

/// Protocol layer bring-up.
pub trait ProtocolEndpoints {
    fn init_endpoints(&mut self);
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitReason {
    /// The operator released the exit-hold signal.
    HoldReleased,
    /// The protocol layer raised the completion signal.
    Completed,
}

/// Supervisor state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    Idle,
    Starting,
    Running,
    /// Terminal; the session hands off to the bank-swap controller.
    Exiting(ExitReason),
}

/// Per-cycle state owned by the session. Never persisted.
#[derive(Debug)]
pub struct BootContext<'a> {
    update_region_size: u32,
    session_active: bool,
    force_exit: &'a CompletionSignal,
}

impl<'a> BootContext<'a> {
    /// Create the context once the capacity probe has completed.
    pub fn new(update_region_size: u32, force_exit: &'a CompletionSignal) -> Self {
        Self {
            update_region_size,
            session_active: false,
            force_exit,
        }
    }

    pub fn update_region_size(&self) -> u32 {
        self.update_region_size
    }

    pub fn session_active(&self) -> bool {
        self.session_active
    }

    pub fn force_exit_requested(&self) -> bool {
        self.force_exit.is_raised()
    }
}

/// One update session: transport bring-up, service loop, exit detection.
pub struct UpdateSession<'a, L, H> {
    ctx: BootContext<'a>,
    link: L,
    hold: H,
    state: SessionState,
}

impl<'a, L, H> UpdateSession<'a, L, H>
where
    L: Transport + ProtocolEndpoints,
    H: HoldSignal,
{
    pub fn new(ctx: BootContext<'a>, link: L, hold: H) -> Self {
        Self {
            ctx,
            link,
            hold,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn context(&self) -> &BootContext<'a> {
        &self.ctx
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Bring the transport and protocol up. Only valid from `Idle`.
    pub fn start(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }

        self.state = SessionState::Starting;
        self.link.open();
        self.link.init_endpoints();
        self.link.start();

        self.ctx.session_active = true;
        self.state = SessionState::Running;
    }

    /// Run one supervisor iteration.
    ///
    /// Returns the exit reason once the session has reached `Exiting`, and
    /// `None` while it is running or has not been started.
    pub fn step(&mut self) -> Option<ExitReason> {
        match self.state {
            SessionState::Running => {}
            SessionState::Exiting(reason) => return Some(reason),
            SessionState::Idle | SessionState::Starting => return None,
        }

        let exit = if !self.hold.is_held() {
            Some(ExitReason::HoldReleased)
        } else if self.ctx.force_exit_requested() {
            Some(ExitReason::Completed)
        } else {
            None
        };

        match exit {
            Some(reason) => {
                self.ctx.session_active = false;
                self.state = SessionState::Exiting(reason);
            }
            None => self.link.service_once(),
        }

        exit
    }

    /// Start if needed and service the transport until an exit condition holds.
    ///
    /// There is no timeout: with the hold signal asserted and no completion,
    /// this never returns.
    pub fn run(&mut self) -> ExitReason {
        self.start();
        loop {
            if let Some(reason) = self.step() {
                return reason;
            }
        }
    }
}
