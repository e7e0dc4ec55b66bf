// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv7-A exception support
//!
//! Trap numbers are the slots of the ARM exception vector table. The
//! trampoline stores the fault status/address registers of both abort kinds
//! in front of the banked core registers.

pub mod faults;

pub use faults::Armv7a;

use crate::traits::{Register, TrapContext};

/// Exception vector slots
pub mod exc {
    use crate::exception::TrapNumber;

    pub const RESET: TrapNumber = 0;
    pub const UNDEFINED: TrapNumber = 1;
    pub const SVC: TrapNumber = 2;
    pub const PREFETCH_ABORT: TrapNumber = 3;
    pub const DATA_ABORT: TrapNumber = 4;
    pub const HYP_TRAP: TrapNumber = 5;
    pub const IRQ: TrapNumber = 6;
    pub const FIQ: TrapNumber = 7;
}

/// CPSR.M mask
pub const PSR_MODE_MASK: u32 = 0x1f;
pub const PSR_MODE_USR: u32 = 0x10;
pub const PSR_MODE_FIQ: u32 = 0x11;
pub const PSR_MODE_IRQ: u32 = 0x12;
pub const PSR_MODE_SVC: u32 = 0x13;
pub const PSR_MODE_ABT: u32 = 0x17;
pub const PSR_MODE_UND: u32 = 0x1b;
pub const PSR_MODE_SYS: u32 = 0x1f;

static R_NAMES: [&str; 13] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "fp", "ip",
];

/// Register state saved by the exception vector stubs
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Armv7aContext {
    pub dfsr: u32,
    pub dfar: u32,
    pub ifsr: u32,
    pub ifar: u32,
    pub r: [u32; 13],
    pub sp: u32,
    pub lr: u32,
    pub pc: u32,
    /// SPSR of the exception mode, i.e. the interrupted CPSR
    pub cpsr: u32,
}

impl Armv7aContext {
    /// Processor mode of the interrupted code
    pub fn mode(&self) -> u32 {
        self.cpsr & PSR_MODE_MASK
    }
}

impl TrapContext for Armv7aContext {
    fn program_counter(&self) -> usize {
        self.pc as usize
    }

    fn fault_status(&self) -> usize {
        self.dfsr as usize
    }

    fn fault_address(&self) -> usize {
        self.dfar as usize
    }

    fn is_user_mode(&self) -> bool {
        self.mode() == PSR_MODE_USR
    }

    fn return_value(&self) -> usize {
        self.r[0] as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        R_NAMES
            .iter()
            .zip(self.r.iter())
            .map(|(name, value)| Register::new32(*name, *value))
            .chain([
                Register::new32("sp", self.sp),
                Register::new32("lr", self.lr),
                Register::new32("pc", self.pc),
                Register::new32("cpsr", self.cpsr),
                Register::new32("dfsr", self.dfsr),
                Register::new32("dfar", self.dfar),
                Register::new32("ifsr", self.ifsr),
                Register::new32("ifar", self.ifar),
            ])
    }
}
