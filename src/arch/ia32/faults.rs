// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! IA-32 fault decoding
//!
//! Only #PF is a memory abort. Its error code has the same layout as on
//! x86-64, so it is decoded with the `x86_64` crate's flag type; the faulting
//! linear address is in CR2.

use x86_64::structures::idt::PageFaultErrorCode;

use super::{vector, Ia32Context};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::{TrapArch, TrapContext};

const MNEMONICS: [&str; 32] = [
    "divide error",
    "debug",
    "NMI",
    "breakpoint",
    "overflow",
    "BOUND range exceeded",
    "invalid opcode",
    "device not available",
    "double fault",
    "coprocessor segment overrun",
    "invalid TSS",
    "segment not present",
    "stack-segment fault",
    "general protection",
    "page fault",
    "reserved",
    "x87 FPU error",
    "alignment check",
    "machine check",
    "SIMD FP exception",
    "virtualization",
    "control protection",
    "reserved",
    "reserved",
    "reserved",
    "reserved",
    "reserved",
    "reserved",
    "hypervisor injection",
    "VMM communication",
    "security exception",
    "reserved",
];

const SYSCALL: &str = "system call";
const IRQ: &str = "external interrupt";

/// IA-32 adapter
pub struct Ia32;

impl TrapArch for Ia32 {
    type Context = Ia32Context;

    const NAME: &'static str = "ia32";
    const TRAP_COUNT: TrapNumber = 256;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] = &[vector::PAGE_FAULT];
    const DUMP_SIZE: usize = 512;
    const DUMP_COLUMNS: usize = 4;
    const REGISTER_COUNT: usize = 24;
    const REGISTER_DIGITS: usize = 8;
    const MAX_MNEMONIC_LEN: usize = longest(&MNEMONICS, IRQ);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        match trap {
            vector::SYSCALL => SYSCALL,
            t if t < vector::IRQ_BASE => MNEMONICS[t as usize],
            _ => IRQ,
        }
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        match trap {
            vector::NMI => TrapKind::Interrupt,
            vector::BREAKPOINT | vector::OVERFLOW | vector::SYSCALL => TrapKind::Software,
            vector::COPROC_OVERRUN | 15 | 22..=27 | 31 => TrapKind::Reserved,
            t if t < vector::IRQ_BASE => TrapKind::Fault,
            t if t < Self::TRAP_COUNT => TrapKind::Interrupt,
            _ => TrapKind::Reserved,
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &Ia32Context) -> Protection {
        if trap != vector::PAGE_FAULT {
            return Protection::empty();
        }

        let err = PageFaultErrorCode::from_bits_truncate(u64::from(ctx.err));
        let mut prot = if err.contains(PageFaultErrorCode::INSTRUCTION_FETCH) {
            Protection::EXEC
        } else if err.contains(PageFaultErrorCode::CAUSED_BY_WRITE) {
            Protection::WRITE
        } else {
            Protection::READ
        };

        if err.contains(PageFaultErrorCode::USER_MODE) || ctx.is_user_mode() {
            prot |= Protection::USER;
        }
        prot
    }

    fn fault_address(trap: TrapNumber, ctx: &Ia32Context) -> Option<usize> {
        (trap == vector::PAGE_FAULT).then_some(ctx.cr2 as usize)
    }
}

const _: () = assert!(Ia32::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(Ia32::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<Ia32>() <= Ia32::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================
