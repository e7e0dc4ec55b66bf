// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Cross-architecture exception traits
//!
//! This module defines the seams between the generic exception core and the
//! architecture adapters, and between the core and the rest of the kernel.
//!
//! Each architecture (ia32, armv7a, armv7m, arm64, riscv64, sparcv8leon)
//! implements [`TrapArch`] and [`TrapContext`]. The board implements
//! [`Platform`].

use crate::exception::{Protection, TrapKind, TrapNumber};

/// Width of a saved register, as rendered in a context dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWidth {
    /// 32-bit register (8 hex digits)
    W32,
    /// 64-bit register (16 hex digits)
    W64,
}

impl RegisterWidth {
    /// Number of zero-padded hex digits used to render the register
    pub const fn digits(self) -> usize {
        match self {
            RegisterWidth::W32 => 8,
            RegisterWidth::W64 => 16,
        }
    }
}

/// A named register value taken from a context snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    pub name: &'static str,
    pub value: u64,
    pub width: RegisterWidth,
}

impl Register {
    pub const fn new32(name: &'static str, value: u32) -> Self {
        Self {
            name,
            value: value as u64,
            width: RegisterWidth::W32,
        }
    }

    pub const fn new64(name: &'static str, value: u64) -> Self {
        Self {
            name,
            value,
            width: RegisterWidth::W64,
        }
    }
}

/// Accessors every saved register snapshot provides
///
/// The snapshot is built by the architecture trampoline, usually on the
/// kernel stack of the interrupted thread. The exception core only borrows it
/// for the duration of a single dispatch.
pub trait TrapContext {
    /// Address of the faulting (or interrupted) instruction
    fn program_counter(&self) -> usize;

    /// Raw fault status register (ESR, DFSR, CFSR, error code, ...)
    ///
    /// Where the hardware banks status per abort kind this is the data side;
    /// [`TrapArch::fault_status`] picks the register matching a trap.
    fn fault_status(&self) -> usize;

    /// Raw fault address register, regardless of whether it is valid
    ///
    /// Data side as well when banked, see [`TrapArch::fault_address`].
    fn fault_address(&self) -> usize;

    /// Whether the trap was taken from unprivileged execution
    fn is_user_mode(&self) -> bool;

    /// The register a handler writes its return value into
    fn return_value(&self) -> usize;

    /// Every register in dump order
    fn registers(&self) -> impl Iterator<Item = Register> + '_;
}

/// Architecture adapter for the exception core
///
/// Implemented by a zero-sized marker type per architecture. The associated
/// constants describe the trap number space and the dump geometry; the
/// functions hold the architecture-specific fault decoding.
pub trait TrapArch: 'static {
    /// Saved register layout
    type Context: TrapContext;

    /// Short architecture name used in log messages
    const NAME: &'static str;

    /// Valid trap numbers are `0..TRAP_COUNT`
    const TRAP_COUNT: TrapNumber;

    /// Trap numbers a `Target::PageFault` registration fans out to
    const PAGEFAULT_TRAPS: &'static [TrapNumber];

    /// Size of the diagnostic dump buffer
    const DUMP_SIZE: usize;

    /// Registers rendered per dump line
    const DUMP_COLUMNS: usize;

    /// Number of registers yielded by [`TrapContext::registers`]
    const REGISTER_COUNT: usize;

    /// Hex digits per register value
    const REGISTER_DIGITS: usize;

    /// Length of the longest string [`TrapArch::mnemonic`] can return
    const MAX_MNEMONIC_LEN: usize;

    /// Human readable name of a trap number
    fn mnemonic(trap: TrapNumber) -> &'static str;

    /// Coarse class of a trap number
    fn trap_kind(trap: TrapNumber) -> TrapKind;

    /// Access semantics of a memory abort, empty for any other trap
    fn classify_fault(trap: TrapNumber, ctx: &Self::Context) -> Protection;

    /// Faulting data/instruction address, when the hardware reports a valid one
    fn fault_address(trap: TrapNumber, ctx: &Self::Context) -> Option<usize>;

    /// Fault status register describing a trap
    fn fault_status(_trap: TrapNumber, ctx: &Self::Context) -> usize {
        ctx.fault_status()
    }

    /// Faulting instruction address
    fn program_counter(ctx: &Self::Context) -> usize {
        ctx.program_counter()
    }
}

/// Saved interrupt state returned by [`IrqControl::irq_save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqState(pub usize);

/// Local interrupt masking
pub trait IrqControl {
    /// Disable interrupts on the current core and return the previous state
    fn irq_save(&self) -> IrqState;

    /// Restore a state returned by [`IrqControl::irq_save`]
    fn irq_restore(&self, state: IrqState);
}

/// Kernel services the exception core calls out to
///
/// # Contract
///
/// * `print_bold` must work from trap context without allocating.
/// * `reset` and `halt` never return.
pub trait Platform<A: TrapArch>: IrqControl + Sync {
    /// Print text to the console, highlighted
    fn print_bold(&self, text: &str);

    /// Let pending signals interrupt the return to user mode
    fn setup_user_return(&self, retval: usize, ctx: &mut A::Context);

    /// Persist the snapshot before the system goes down
    fn coredump(&self, _trap: TrapNumber, _ctx: &A::Context) {}

    /// Hardware reset
    fn reset(&self) -> !;

    /// Stop the core, preserving state for an attached debugger
    fn halt(&self) -> !;
}

// ============================================================================
// Tests
// ============================================================================
