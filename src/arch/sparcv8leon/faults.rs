// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! SPARC V8 (LEON) fault decoding
//!
//! Memory aborts are described by the SRMMU fault status register: the
//! access type field gives direction and privilege, FAV marks the fault
//! address register valid.

use super::{tt, SparcV8LeonContext};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::TrapArch;

/// SRMMU fault status register fields
pub mod mmu_fsr {
    /// Fault address valid
    pub const FAV: u32 = 1 << 1;
    /// Fault type
    pub const FT_SHIFT: u32 = 2;
    pub const FT_MASK: u32 = 0x7;
    /// Access type
    pub const AT_SHIFT: u32 = 5;
    pub const AT_MASK: u32 = 0x7;

    /// Access type bit: supervisor access
    pub const AT_SUPERVISOR: u32 = 1 << 0;
    /// Access type bit: instruction access
    pub const AT_INSN: u32 = 1 << 1;
    /// Access type bit: store
    pub const AT_STORE: u32 = 1 << 2;

    /// Access type field of a raw FSR value
    pub const fn access_type(fsr: u32) -> u32 {
        (fsr >> AT_SHIFT) & AT_MASK
    }

    /// Fault type field of a raw FSR value
    pub const fn fault_type(fsr: u32) -> u32 {
        (fsr >> FT_SHIFT) & FT_MASK
    }
}

const MNEMONICS: [(TrapNumber, &str); 22] = [
    (tt::RESET, "reset"),
    (tt::INSN_ACCESS_EXCEPTION, "instruction access exception"),
    (tt::ILLEGAL_INSN, "illegal instruction"),
    (tt::PRIVILEGED_INSN, "privileged instruction"),
    (tt::FP_DISABLED, "fp disabled"),
    (tt::WINDOW_OVERFLOW, "window overflow"),
    (tt::WINDOW_UNDERFLOW, "window underflow"),
    (tt::MEM_ADDRESS_NOT_ALIGNED, "memory address not aligned"),
    (tt::FP_EXCEPTION, "fp exception"),
    (tt::DATA_ACCESS_EXCEPTION, "data access exception"),
    (tt::TAG_OVERFLOW, "tag overflow"),
    (tt::WATCHPOINT, "watchpoint detected"),
    (tt::R_REGISTER_ACCESS_ERROR, "r register access error"),
    (tt::INSN_ACCESS_ERROR, "instruction access error"),
    (tt::CP_DISABLED, "cp disabled"),
    (tt::UNIMPLEMENTED_FLUSH, "unimplemented FLUSH"),
    (tt::CP_EXCEPTION, "cp exception"),
    (tt::DATA_ACCESS_ERROR, "data access error"),
    (tt::DIVISION_BY_ZERO, "division by zero"),
    (tt::DATA_STORE_ERROR, "data store error"),
    (tt::DATA_ACCESS_MMU_MISS, "data access MMU miss"),
    (tt::INSN_ACCESS_MMU_MISS, "instruction access MMU miss"),
];

const fn mnemonic_names() -> [&'static str; 22] {
    let mut names = [""; 22];
    let mut i = 0;
    while i < MNEMONICS.len() {
        names[i] = MNEMONICS[i].1;
        i += 1;
    }
    names
}

const INTERRUPT: &str = "interrupt";
const SOFTWARE_TRAP: &str = "software trap";
const RESERVED: &str = "reserved";

fn is_interrupt(trap: TrapNumber) -> bool {
    (tt::INTERRUPT_LEVEL_1..=tt::INTERRUPT_LEVEL_15).contains(&trap)
}

/// SPARC V8 LEON adapter
pub struct SparcV8Leon;

impl TrapArch for SparcV8Leon {
    type Context = SparcV8LeonContext;

    const NAME: &'static str = "sparcv8leon";
    const TRAP_COUNT: TrapNumber = 256;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] = &[
        tt::INSN_ACCESS_EXCEPTION,
        tt::DATA_ACCESS_EXCEPTION,
        tt::DATA_ACCESS_MMU_MISS,
        tt::INSN_ACCESS_MMU_MISS,
    ];
    const DUMP_SIZE: usize = 768;
    const DUMP_COLUMNS: usize = 5;
    const REGISTER_COUNT: usize = 39;
    const REGISTER_DIGITS: usize = 8;
    const MAX_MNEMONIC_LEN: usize = longest(&mnemonic_names(), SOFTWARE_TRAP);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        if is_interrupt(trap) {
            return INTERRUPT;
        }
        if (tt::SOFTWARE_TRAP..Self::TRAP_COUNT).contains(&trap) {
            return SOFTWARE_TRAP;
        }
        MNEMONICS
            .iter()
            .find(|&&(number, _)| number == trap)
            .map_or(RESERVED, |&(_, name)| name)
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        if is_interrupt(trap) {
            TrapKind::Interrupt
        } else if (tt::SOFTWARE_TRAP..Self::TRAP_COUNT).contains(&trap) {
            TrapKind::Software
        } else if MNEMONICS.iter().any(|&(number, _)| number == trap) {
            TrapKind::Fault
        } else {
            TrapKind::Reserved
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &SparcV8LeonContext) -> Protection {
        if !Self::PAGEFAULT_TRAPS.contains(&trap) {
            return Protection::empty();
        }

        let at = mmu_fsr::access_type(ctx.mmu_fsr);
        let mut prot = if at & mmu_fsr::AT_STORE != 0 {
            Protection::WRITE
        } else if at & mmu_fsr::AT_INSN != 0 {
            Protection::EXEC
        } else {
            Protection::READ
        };

        if at & mmu_fsr::AT_SUPERVISOR == 0 {
            prot |= Protection::USER;
        }
        prot
    }

    fn fault_address(trap: TrapNumber, ctx: &SparcV8LeonContext) -> Option<usize> {
        let valid = ctx.mmu_fsr & mmu_fsr::FAV != 0;
        (Self::PAGEFAULT_TRAPS.contains(&trap) && valid).then_some(ctx.mmu_far as usize)
    }
}

const _: () = assert!(SparcV8Leon::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(SparcV8Leon::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<SparcV8Leon>() <= SparcV8Leon::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================
