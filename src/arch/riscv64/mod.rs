// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! RISC-V 64 exception support
//!
//! Trap numbers are supervisor exception codes (`scause` with the interrupt
//! bit clear). Interrupts go through the PLIC/CLINT path and never reach
//! this table. The trap vector saves `x1`-`x31`, `sepc`, `sstatus`,
//! `scause` and `stval`.

pub mod faults;

pub use faults::Riscv64;

use crate::traits::{Register, TrapContext};

/// Exception codes (scause, interrupt bit clear)
pub mod cause {
    use crate::exception::TrapNumber;

    pub const INSN_MISALIGNED: TrapNumber = 0;
    pub const INSN_ACCESS_FAULT: TrapNumber = 1;
    pub const ILLEGAL_INSN: TrapNumber = 2;
    pub const BREAKPOINT: TrapNumber = 3;
    pub const LOAD_MISALIGNED: TrapNumber = 4;
    pub const LOAD_ACCESS_FAULT: TrapNumber = 5;
    pub const STORE_MISALIGNED: TrapNumber = 6;
    pub const STORE_ACCESS_FAULT: TrapNumber = 7;
    pub const ECALL_U: TrapNumber = 8;
    pub const ECALL_S: TrapNumber = 9;
    pub const ECALL_M: TrapNumber = 11;
    pub const FETCH_PAGE_FAULT: TrapNumber = 12;
    pub const LOAD_PAGE_FAULT: TrapNumber = 13;
    pub const STORE_PAGE_FAULT: TrapNumber = 15;
}

/// sstatus.SPP: trap taken from S-mode
pub const SSTATUS_SPP: u64 = 1 << 8;

/// ABI names of x1-x31
static X_NAMES: [&str; 31] = [
    "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5",
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4", "t5",
    "t6",
];

/// Index of a0 in [`Riscv64Context::x`]
pub const A0: usize = 9;

/// Register state saved by the supervisor trap vector
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Riscv64Context {
    /// x1-x31; x0 is hardwired to zero and not saved
    pub x: [u64; 31],
    pub sepc: u64,
    pub sstatus: u64,
    pub scause: u64,
    pub stval: u64,
}

impl TrapContext for Riscv64Context {
    fn program_counter(&self) -> usize {
        self.sepc as usize
    }

    fn fault_status(&self) -> usize {
        self.scause as usize
    }

    fn fault_address(&self) -> usize {
        self.stval as usize
    }

    fn is_user_mode(&self) -> bool {
        self.sstatus & SSTATUS_SPP == 0
    }

    fn return_value(&self) -> usize {
        self.x[A0] as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        X_NAMES
            .iter()
            .zip(self.x.iter())
            .map(|(name, value)| Register::new64(*name, *value))
            .chain([
                Register::new64("pc", self.sepc),
                Register::new64("sstat", self.sstatus),
                Register::new64("cause", self.scause),
                Register::new64("stval", self.stval),
            ])
    }
}
