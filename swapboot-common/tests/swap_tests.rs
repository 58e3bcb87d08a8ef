// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the bank-swap and reset controller.

use std::panic::{self, AssertUnwindSafe};

use swapboot_common::handoff::{decide_handoff, BankValidation, Handoff};
use swapboot_common::hw::{BankSelector, ResetLatch, SystemReset, UpdateAccess};
use swapboot_common::session::{ProtocolEndpoints, Transport};
use swapboot_common::{
    evaluate_entry, finalize_and_reset, prepare_reset, Bank, BootContext, BootData,
    CompletionSignal, ExitReason, ResetCause, SessionConfig, SwapOutcome, SwapPolicy,
    UpdateSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    ClearCause,
    DisableAccess,
    EnableAccess,
    Toggle,
    Reset,
}

/// Board stand-in recording every controller call in order.
struct MockBoard {
    ops: Vec<Op>,
    cause: ResetCause,
    bank: Bank,
    access: bool,
}

impl MockBoard {
    fn new(bank: Bank, cause: ResetCause) -> Self {
        Self {
            ops: Vec::new(),
            cause,
            bank,
            access: false,
        }
    }

    fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|&&o| o == op).count()
    }
}

impl ResetLatch for MockBoard {
    fn reset_cause(&self) -> ResetCause {
        self.cause
    }

    fn clear_reset_cause(&mut self, causes: ResetCause) {
        self.ops.push(Op::ClearCause);
        self.cause.remove(causes);
    }
}

impl BankSelector for MockBoard {
    fn active_bank(&self) -> Bank {
        self.bank
    }

    fn toggle_active_bank(&mut self) {
        self.ops.push(Op::Toggle);
        self.bank = self.bank.toggled();
    }
}

impl UpdateAccess for MockBoard {
    fn enable_update_access(&mut self) {
        self.ops.push(Op::EnableAccess);
        self.access = true;
    }

    fn disable_update_access(&mut self) {
        self.ops.push(Op::DisableAccess);
        self.access = false;
    }
}

impl SystemReset for MockBoard {
    fn request_system_reset(&mut self) {
        self.ops.push(Op::Reset);
        panic!("system reset");
    }
}

/// Run `finalize_and_reset` and stop at the (panicking) reset.
fn finalize(board: &mut MockBoard, policy: SwapPolicy, exit: ExitReason) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        finalize_and_reset(board, policy, exit);
    }));
    assert!(result.is_err(), "finalize_and_reset returned without resetting");
}

// =============================================================================
// Step order
// =============================================================================

#[test]
fn test_finalize_order() {
    let mut board = MockBoard::new(Bank::A, ResetCause::SOFTWARE);
    board.enable_update_access();
    board.ops.clear();

    finalize(&mut board, SwapPolicy::Always, ExitReason::Completed);

    assert_eq!(
        board.ops,
        vec![Op::ClearCause, Op::DisableAccess, Op::Toggle, Op::Reset]
    );
}

#[test]
fn test_finalize_leaves_clean_state() {
    let mut board = MockBoard::new(Bank::A, ResetCause::SOFTWARE | ResetCause::POWER_ON);
    board.enable_update_access();

    finalize(&mut board, SwapPolicy::Always, ExitReason::HoldReleased);

    assert!(board.cause.is_empty());
    assert!(!board.access);
    assert_eq!(board.bank, Bank::B);
}

#[test]
fn test_exactly_one_toggle_and_clear_for_each_exit_reason() {
    for exit in [ExitReason::HoldReleased, ExitReason::Completed] {
        let mut board = MockBoard::new(Bank::B, ResetCause::empty());
        finalize(&mut board, SwapPolicy::Always, exit);

        assert_eq!(board.count(Op::Toggle), 1, "{:?}", exit);
        assert_eq!(board.count(Op::ClearCause), 1, "{:?}", exit);
        assert_eq!(board.count(Op::Reset), 1, "{:?}", exit);
        assert_eq!(board.bank, Bank::A);
    }
}

#[test]
fn test_two_sessions_restore_bank() {
    let mut board = MockBoard::new(Bank::A, ResetCause::empty());
    finalize(&mut board, SwapPolicy::Always, ExitReason::Completed);
    finalize(&mut board, SwapPolicy::Always, ExitReason::Completed);
    assert_eq!(board.bank, Bank::A);
    assert_eq!(board.count(Op::Toggle), 2);
}

// =============================================================================
// prepare_reset / policy tests
// =============================================================================

#[test]
fn test_prepare_reset_reports_new_bank() {
    let mut board = MockBoard::new(Bank::A, ResetCause::empty());
    let outcome = prepare_reset(&mut board, SwapPolicy::Always, ExitReason::HoldReleased);
    assert_eq!(outcome, SwapOutcome::Swapped { to: Bank::B });
    assert_eq!(board.count(Op::Reset), 0);
}

#[test]
fn test_completed_only_keeps_bank_on_hold_release() {
    let mut board = MockBoard::new(Bank::A, ResetCause::SOFTWARE);
    let outcome = prepare_reset(&mut board, SwapPolicy::CompletedOnly, ExitReason::HoldReleased);

    assert_eq!(outcome, SwapOutcome::Kept { bank: Bank::A });
    assert_eq!(board.ops, vec![Op::ClearCause, Op::DisableAccess]);
    assert!(board.cause.is_empty());
}

#[test]
fn test_completed_only_swaps_on_completion() {
    let mut board = MockBoard::new(Bank::B, ResetCause::empty());
    let outcome = prepare_reset(&mut board, SwapPolicy::CompletedOnly, ExitReason::Completed);
    assert_eq!(outcome, SwapOutcome::Swapped { to: Bank::A });
}

#[test]
fn test_policy_predicate() {
    assert!(SwapPolicy::Always.should_swap(ExitReason::HoldReleased));
    assert!(SwapPolicy::Always.should_swap(ExitReason::Completed));
    assert!(!SwapPolicy::CompletedOnly.should_swap(ExitReason::HoldReleased));
    assert!(SwapPolicy::CompletedOnly.should_swap(ExitReason::Completed));
}

// =============================================================================
// Full cycle: entry gate -> session exit -> next boot
// =============================================================================

#[test]
fn test_abnormal_reset_cycle_clears_latch() {
    let mut board = MockBoard::new(Bank::A, ResetCause::SOFTWARE);

    assert!(evaluate_entry(false, &mut board));
    finalize(&mut board, SwapPolicy::Always, ExitReason::Completed);

    assert!(!evaluate_entry(false, &mut board));
    assert_eq!(board.bank, Bank::B);
}

// =============================================================================
// Fallback session (active bank not bootable)
// =============================================================================

/// Transport that raises completion on its first service when `completes` is set.
struct IdleLink<'a> {
    signal: &'a CompletionSignal,
    completes: bool,
}

impl Transport for IdleLink<'_> {
    fn open(&mut self) {}
    fn start(&mut self) {}
    fn service_once(&mut self) {
        if self.completes {
            self.signal.raise();
        }
    }
}

impl ProtocolEndpoints for IdleLink<'_> {
    fn init_endpoints(&mut self) {}
}

/// One boot with nothing bootable: fallback session, then finalize.
fn fallback_cycle(board: &mut MockBoard, hold: bool, completes: bool) -> ExitReason {
    let bd = BootData {
        active_bank: board.bank.selector(),
        ..BootData::default_new()
    };
    assert_eq!(
        decide_handoff(&bd, BankValidation::default()),
        Handoff::EnterUpdate
    );

    let config = SessionConfig::DEFAULT.for_fallback();
    let signal = CompletionSignal::new();
    let link = IdleLink {
        signal: &signal,
        completes,
    };
    let mut session = UpdateSession::new(BootContext::new(0, &signal), link, move || hold);
    let exit = session.run();
    finalize(board, config.swap_policy, exit);
    exit
}

#[test]
fn test_fallback_released_hold_never_rewrites_selector() {
    let mut board = MockBoard::new(Bank::A, ResetCause::empty());
    for _ in 0..5 {
        assert_eq!(fallback_cycle(&mut board, false, false), ExitReason::HoldReleased);
    }
    assert_eq!(board.count(Op::Toggle), 0);
    assert_eq!(board.count(Op::Reset), 5);
    assert_eq!(board.bank, Bank::A);
}

#[test]
fn test_fallback_completed_transfer_swaps() {
    let mut board = MockBoard::new(Bank::A, ResetCause::empty());
    assert_eq!(fallback_cycle(&mut board, true, true), ExitReason::Completed);
    assert_eq!(board.count(Op::Toggle), 1);
    assert_eq!(board.bank, Bank::B);
}

#[test]
fn test_fallback_config_keeps_min_unit() {
    let config = SessionConfig::DEFAULT.for_fallback();
    assert_eq!(config.swap_policy, SwapPolicy::CompletedOnly);
    assert_eq!(config.min_probe_unit, SessionConfig::DEFAULT.min_probe_unit);
}
