// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Generic exception handling
//!
//! This module provides the architecture-independent exception core:
//!
//! - [`registry`]: trap number to handler table
//! - [`dispatch`]: entry point called by the trap trampoline
//! - [`fault`]: protection flags and fault address decoding
//! - [`dump`]: bounded register dump for the fatal path
//!
//! All of it is generic over a [`TrapArch`](crate::traits::TrapArch) adapter.

pub mod dispatch;
pub mod dump;
pub mod fault;
pub mod registry;

pub use dispatch::{Exceptions, FatalPolicy, FATAL_POLICY};
pub use dump::{dump_context, worst_case_len, ContextDump, MAX_DUMP_SIZE};
pub use fault::{classify_fault, fault_address, program_counter, FaultInfo, Protection};
pub use registry::{HandlerRef, HandlerRegistry, TrapHandler, MAX_TRAP_COUNT};

/// Hardware trap/exception number
pub type TrapNumber = u32;

/// Coarse class of a trap number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapKind {
    /// Synchronous fault (abort, undefined instruction, ...)
    Fault,
    /// Asynchronous interrupt
    Interrupt,
    /// Software trap (syscall, breakpoint instruction)
    Software,
    /// Reserved by the architecture
    Reserved,
}

/// Registration target
///
/// `Default` and `PageFault` are the two reserved pseudo-numbers: they never
/// name a hardware trap, only a registration convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A single hardware trap number
    Trap(TrapNumber),
    /// Fallback for every trap without an explicit handler
    Default,
    /// Every trap the architecture designates as a memory abort
    PageFault,
}

impl From<TrapNumber> for Target {
    fn from(trap: TrapNumber) -> Self {
        Target::Trap(trap)
    }
}
