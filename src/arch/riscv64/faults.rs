// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! RISC-V 64 fault decoding
//!
//! The access direction is encoded in the exception code itself, and `stval`
//! holds the faulting virtual address for every page and access fault.

use super::{cause, Riscv64Context};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::{TrapArch, TrapContext};

const MNEMONICS: [&str; 16] = [
    "instruction address misaligned",
    "instruction access fault",
    "illegal instruction",
    "breakpoint",
    "load address misaligned",
    "load access fault",
    "store address misaligned",
    "store access fault",
    "environment call from U-mode",
    "environment call from S-mode",
    "reserved",
    "environment call from M-mode",
    "instruction page fault",
    "load page fault",
    "reserved",
    "store page fault",
];

const RESERVED: &str = "reserved";

/// Access implied by an abort exception code
fn abort_access(trap: TrapNumber) -> Option<Protection> {
    match trap {
        cause::FETCH_PAGE_FAULT | cause::INSN_ACCESS_FAULT => Some(Protection::EXEC),
        cause::LOAD_PAGE_FAULT | cause::LOAD_ACCESS_FAULT => Some(Protection::READ),
        cause::STORE_PAGE_FAULT | cause::STORE_ACCESS_FAULT => Some(Protection::WRITE),
        _ => None,
    }
}

/// RISC-V 64 adapter
pub struct Riscv64;

impl TrapArch for Riscv64 {
    type Context = Riscv64Context;

    const NAME: &'static str = "riscv64";
    const TRAP_COUNT: TrapNumber = 16;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] = &[
        cause::FETCH_PAGE_FAULT,
        cause::LOAD_PAGE_FAULT,
        cause::STORE_PAGE_FAULT,
    ];
    const DUMP_SIZE: usize = 1024;
    const DUMP_COLUMNS: usize = 4;
    const REGISTER_COUNT: usize = 35;
    const REGISTER_DIGITS: usize = 16;
    const MAX_MNEMONIC_LEN: usize = longest(&MNEMONICS, RESERVED);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        MNEMONICS.get(trap as usize).copied().unwrap_or(RESERVED)
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        match trap {
            cause::BREAKPOINT | cause::ECALL_U | cause::ECALL_S | cause::ECALL_M => {
                TrapKind::Software
            }
            10 | 14 => TrapKind::Reserved,
            t if t < Self::TRAP_COUNT => TrapKind::Fault,
            _ => TrapKind::Reserved,
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &Riscv64Context) -> Protection {
        match abort_access(trap) {
            Some(prot) if ctx.is_user_mode() => prot | Protection::USER,
            Some(prot) => prot,
            None => Protection::empty(),
        }
    }

    fn fault_address(trap: TrapNumber, ctx: &Riscv64Context) -> Option<usize> {
        abort_access(trap).map(|_| ctx.stval as usize)
    }
}

const _: () = assert!(Riscv64::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(Riscv64::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<Riscv64>() <= Riscv64::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================
