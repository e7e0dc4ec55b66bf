// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 (AArch64) exception support
//!
//! Synchronous exceptions taken to EL1 are dispatched on their exception
//! class, `ESR_EL1.EC`, so trap numbers range over `0..64`. The trampoline
//! saves `x0`-`x30`, `SP_EL0`, `ELR_EL1`, `SPSR_EL1`, `ESR_EL1` and
//! `FAR_EL1`.

pub mod faults;

pub use faults::{AbortIss, Aarch64};

use crate::exception::TrapNumber;
use crate::traits::{Register, TrapContext};

/// Exception classes (ESR_EL1.EC)
pub mod ec {
    use crate::exception::TrapNumber;

    pub const UNKNOWN: TrapNumber = 0x00;
    pub const WFX: TrapNumber = 0x01;
    pub const CP15_MCR: TrapNumber = 0x03;
    pub const CP15_MCRR: TrapNumber = 0x04;
    pub const CP14_MCR: TrapNumber = 0x05;
    pub const CP14_LDC: TrapNumber = 0x06;
    pub const FP_ACCESS: TrapNumber = 0x07;
    pub const CP14_MRRC: TrapNumber = 0x0c;
    pub const BTI: TrapNumber = 0x0d;
    pub const ILLEGAL_STATE: TrapNumber = 0x0e;
    pub const SVC32: TrapNumber = 0x11;
    pub const SVC64: TrapNumber = 0x15;
    pub const SYS64: TrapNumber = 0x18;
    pub const SVE: TrapNumber = 0x19;
    pub const PAC: TrapNumber = 0x1c;
    pub const IABT_LOWER: TrapNumber = 0x20;
    pub const IABT_CURRENT: TrapNumber = 0x21;
    pub const PC_ALIGN: TrapNumber = 0x22;
    pub const DABT_LOWER: TrapNumber = 0x24;
    pub const DABT_CURRENT: TrapNumber = 0x25;
    pub const SP_ALIGN: TrapNumber = 0x26;
    pub const FP_EXC32: TrapNumber = 0x28;
    pub const FP_EXC64: TrapNumber = 0x2c;
    pub const SERROR: TrapNumber = 0x2f;
    pub const BREAKPT_LOWER: TrapNumber = 0x30;
    pub const BREAKPT_CURRENT: TrapNumber = 0x31;
    pub const SOFTSTP_LOWER: TrapNumber = 0x32;
    pub const SOFTSTP_CURRENT: TrapNumber = 0x33;
    pub const WATCHPT_LOWER: TrapNumber = 0x34;
    pub const WATCHPT_CURRENT: TrapNumber = 0x35;
    pub const BKPT32: TrapNumber = 0x38;
    pub const BRK64: TrapNumber = 0x3c;
    // Short alias used by debugger code
    pub const BRK: TrapNumber = BRK64;
}

/// ESR_EL1.EC position
pub const ESR_EC_SHIFT: u64 = 26;

/// ESR_EL1.ISS mask
pub const ESR_ISS_MASK: u64 = 0x01ff_ffff;

/// Exception class of a raw ESR_EL1 value
pub const fn esr_class(esr: u64) -> TrapNumber {
    ((esr >> ESR_EC_SHIFT) & 0x3f) as TrapNumber
}

/// SPSR_EL1.M[4]: exception taken from AArch32
pub const SPSR_M_AARCH32: u64 = 1 << 4;

/// SPSR_EL1.M[3:2]: exception level of an AArch64 source
pub const SPSR_M_EL_MASK: u64 = 0b1100;

/// SPSR_EL1.M[4:0] for AArch32 User mode
pub const SPSR_MODE_AARCH32_USR: u64 = 0x10;

static X_NAMES: [&str; 31] = [
    "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13",
    "x14", "x15", "x16", "x17", "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26",
    "x27", "x28", "x29", "x30",
];

/// Register state saved by the EL1 synchronous exception vector
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aarch64Context {
    pub x: [u64; 31],
    /// SP_EL0
    pub sp: u64,
    /// ELR_EL1
    pub elr: u64,
    /// SPSR_EL1
    pub spsr: u64,
    /// ESR_EL1
    pub esr: u64,
    /// FAR_EL1
    pub far: u64,
}

impl TrapContext for Aarch64Context {
    fn program_counter(&self) -> usize {
        self.elr as usize
    }

    fn fault_status(&self) -> usize {
        self.esr as usize
    }

    fn fault_address(&self) -> usize {
        self.far as usize
    }

    fn is_user_mode(&self) -> bool {
        if self.spsr & SPSR_M_AARCH32 != 0 {
            self.spsr & 0x1f == SPSR_MODE_AARCH32_USR
        } else {
            self.spsr & SPSR_M_EL_MASK == 0
        }
    }

    fn return_value(&self) -> usize {
        self.x[0] as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        X_NAMES
            .iter()
            .zip(self.x.iter())
            .map(|(name, value)| Register::new64(*name, *value))
            .chain([
                Register::new64("sp", self.sp),
                Register::new64("pc", self.elr),
                Register::new64("spsr", self.spsr),
                Register::new64("esr", self.esr),
                Register::new64("far", self.far),
            ])
    }
}
