// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 fault decoding
//!
//! Instruction and data aborts carry their details in the ISS field of
//! ESR_EL1: WnR tells a write from a read, FnV marks FAR_EL1 as invalid.

use bitflags::bitflags;

use super::{ec, Aarch64Context};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::{TrapArch, TrapContext};

bitflags! {
    /// ISS bits of an instruction or data abort
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AbortIss: u64 {
        /// Write not Read
        const WNR = 1 << 6;
        /// Fault on a stage 2 translation table walk
        const S1PTW = 1 << 7;
        /// Cache maintenance operation
        const CM = 1 << 8;
        /// External abort
        const EA = 1 << 9;
        /// FAR not Valid
        const FNV = 1 << 10;
    }
}

const MNEMONICS: [(TrapNumber, &str); 32] = [
    (ec::UNKNOWN, "unknown reason"),
    (ec::WFX, "trapped WFI/WFE"),
    (ec::CP15_MCR, "trapped MCR/MRC (cp15)"),
    (ec::CP15_MCRR, "trapped MCRR/MRRC (cp15)"),
    (ec::CP14_MCR, "trapped MCR/MRC (cp14)"),
    (ec::CP14_LDC, "trapped LDC/STC"),
    (ec::FP_ACCESS, "SVE/SIMD/FP access"),
    (ec::CP14_MRRC, "trapped MRRC (cp14)"),
    (ec::BTI, "branch target exception"),
    (ec::ILLEGAL_STATE, "illegal execution state"),
    (ec::SVC32, "SVC (AArch32)"),
    (ec::SVC64, "SVC (AArch64)"),
    (ec::SYS64, "trapped MSR/MRS/system instruction"),
    (ec::SVE, "SVE access"),
    (ec::PAC, "pointer authentication failure"),
    (ec::IABT_LOWER, "instruction abort from lower EL"),
    (ec::IABT_CURRENT, "instruction abort from current EL"),
    (ec::PC_ALIGN, "PC alignment fault"),
    (ec::DABT_LOWER, "data abort from lower EL"),
    (ec::DABT_CURRENT, "data abort from current EL"),
    (ec::SP_ALIGN, "SP alignment fault"),
    (ec::FP_EXC32, "FP exception (AArch32)"),
    (ec::FP_EXC64, "FP exception (AArch64)"),
    (ec::SERROR, "SError interrupt"),
    (ec::BREAKPT_LOWER, "breakpoint from lower EL"),
    (ec::BREAKPT_CURRENT, "breakpoint from current EL"),
    (ec::SOFTSTP_LOWER, "software step from lower EL"),
    (ec::SOFTSTP_CURRENT, "software step from current EL"),
    (ec::WATCHPT_LOWER, "watchpoint from lower EL"),
    (ec::WATCHPT_CURRENT, "watchpoint from current EL"),
    (ec::BKPT32, "BKPT (AArch32)"),
    (ec::BRK64, "BRK (AArch64)"),
];

const RESERVED: &str = "reserved";

const fn mnemonic_names() -> [&'static str; 32] {
    let mut names = [RESERVED; 32];
    let mut i = 0;
    while i < MNEMONICS.len() {
        names[i] = MNEMONICS[i].1;
        i += 1;
    }
    names
}

/// AArch64 adapter
pub struct Aarch64;

impl TrapArch for Aarch64 {
    type Context = Aarch64Context;

    const NAME: &'static str = "aarch64";
    const TRAP_COUNT: TrapNumber = 64;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] =
        &[ec::IABT_LOWER, ec::IABT_CURRENT, ec::DABT_LOWER, ec::DABT_CURRENT];
    const DUMP_SIZE: usize = 1024;
    const DUMP_COLUMNS: usize = 4;
    const REGISTER_COUNT: usize = 36;
    const REGISTER_DIGITS: usize = 16;
    const MAX_MNEMONIC_LEN: usize = longest(&mnemonic_names(), RESERVED);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        MNEMONICS
            .iter()
            .find(|(class, _)| *class == trap)
            .map_or(RESERVED, |&(_, name)| name)
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        match trap {
            ec::SVC32 | ec::SVC64 | ec::BKPT32 | ec::BRK64 => TrapKind::Software,
            ec::SERROR => TrapKind::Interrupt,
            _ if MNEMONICS.iter().any(|(class, _)| *class == trap) => TrapKind::Fault,
            _ => TrapKind::Reserved,
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &Aarch64Context) -> Protection {
        let iss = AbortIss::from_bits_truncate(ctx.esr);
        let mut prot = match trap {
            ec::IABT_LOWER | ec::IABT_CURRENT => Protection::EXEC,
            // Cache maintenance reports WnR=1 but only needs read permission
            ec::DABT_LOWER | ec::DABT_CURRENT
                if iss.contains(AbortIss::WNR) && !iss.contains(AbortIss::CM) =>
            {
                Protection::WRITE
            }
            ec::DABT_LOWER | ec::DABT_CURRENT => Protection::READ,
            _ => return Protection::empty(),
        };

        if matches!(trap, ec::IABT_LOWER | ec::DABT_LOWER) {
            prot |= Protection::USER;
        }
        prot
    }

    fn fault_address(trap: TrapNumber, ctx: &Aarch64Context) -> Option<usize> {
        if !Self::PAGEFAULT_TRAPS.contains(&trap) {
            return None;
        }
        let iss = AbortIss::from_bits_truncate(ctx.esr);
        if iss.contains(AbortIss::FNV) {
            return None;
        }
        Some(ctx.fault_address())
    }
}

const _: () = assert!(Aarch64::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(Aarch64::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<Aarch64>() <= Aarch64::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================
