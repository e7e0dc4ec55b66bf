// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Fault classification
//!
//! Architecture-neutral entry points over the adapter's fault decoding. The
//! results are pure projections of the snapshot; nothing here is stored.

use bitflags::bitflags;

use super::TrapNumber;
use crate::traits::TrapArch;

bitflags! {
    /// Access semantics of a memory abort
    ///
    /// The empty set means the trap was not a memory abort.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Protection: u32 {
        /// Data read
        const READ = 1 << 0;
        /// Data write
        const WRITE = 1 << 1;
        /// Instruction fetch
        const EXEC = 1 << 2;
        /// Access made by unprivileged code
        const USER = 1 << 3;
    }
}

/// Access semantics of a trap; empty unless it is a memory abort
pub fn classify_fault<A: TrapArch>(trap: TrapNumber, ctx: &A::Context) -> Protection {
    if trap >= A::TRAP_COUNT {
        return Protection::empty();
    }
    A::classify_fault(trap, ctx)
}

/// Faulting address of a memory abort, if the hardware reported a valid one
pub fn fault_address<A: TrapArch>(trap: TrapNumber, ctx: &A::Context) -> Option<usize> {
    if trap >= A::TRAP_COUNT {
        return None;
    }
    A::fault_address(trap, ctx)
}

/// Faulting instruction address
pub fn program_counter<A: TrapArch>(ctx: &A::Context) -> usize {
    A::program_counter(ctx)
}

/// Everything a VM fault handler needs from a memory abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInfo {
    pub trap: TrapNumber,
    pub protection: Protection,
    /// `None` when the fault status marks the address register invalid
    pub address: Option<usize>,
    pub pc: usize,
    /// Raw status register of the abort kind (IFSR vs DFSR and the like)
    pub status: usize,
}

impl FaultInfo {
    /// Decode a memory abort; `None` for any other trap
    pub fn collect<A: TrapArch>(trap: TrapNumber, ctx: &A::Context) -> Option<Self> {
        let protection = classify_fault::<A>(trap, ctx);
        if protection.is_empty() {
            return None;
        }

        Some(Self {
            trap,
            protection,
            address: fault_address::<A>(trap, ctx),
            pc: program_counter::<A>(ctx),
            status: A::fault_status(trap, ctx),
        })
    }

    pub fn is_write(&self) -> bool {
        self.protection.contains(Protection::WRITE)
    }

    pub fn is_user(&self) -> bool {
        self.protection.contains(Protection::USER)
    }
}

// ============================================================================
// Tests
// ============================================================================
