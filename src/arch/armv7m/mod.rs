// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv7-M exception support
//!
//! Trap numbers are NVIC exception numbers: 1-15 are system exceptions,
//! 16 and up are external interrupts. On exception entry the hardware pushes
//! a frame on either the main or the process stack; `EXC_RETURN` tells which
//! one. The trampoline copies both candidate frames into the snapshot along
//! with the callee-saved registers and the SCB fault registers.

pub mod faults;

pub use faults::{Armv7m, Cfsr};

use crate::traits::{Register, TrapContext};

/// NVIC exception numbers
pub mod exc {
    use crate::exception::TrapNumber;

    pub const RESET: TrapNumber = 1;
    pub const NMI: TrapNumber = 2;
    pub const HARD_FAULT: TrapNumber = 3;
    pub const MEM_MANAGE: TrapNumber = 4;
    pub const BUS_FAULT: TrapNumber = 5;
    pub const USAGE_FAULT: TrapNumber = 6;
    pub const SVCALL: TrapNumber = 11;
    pub const DEBUG_MONITOR: TrapNumber = 12;
    pub const PENDSV: TrapNumber = 14;
    pub const SYSTICK: TrapNumber = 15;
    /// First external interrupt
    pub const IRQ0: TrapNumber = 16;
}

/// EXC_RETURN bit 2: return to the process stack
pub const EXC_RETURN_SPSEL: u32 = 1 << 2;

/// EXC_RETURN bit 3: return to thread mode
pub const EXC_RETURN_THREAD: u32 = 1 << 3;

/// CONTROL.nPRIV: thread mode is unprivileged
pub const CONTROL_NPRIV: u32 = 1 << 0;

/// Registers stacked by the hardware on exception entry
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HwFrame {
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r12: u32,
    pub lr: u32,
    pub pc: u32,
    pub psr: u32,
}

static R4_R11_NAMES: [&str; 8] = ["r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11"];

/// Register state saved by the fault trampoline
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Armv7mContext {
    pub psp: u32,
    /// Callee-saved r4-r11
    pub r4_r11: [u32; 8],
    /// EXC_RETURN value found in lr on entry
    pub excret: u32,
    pub control: u32,
    pub cfsr: u32,
    pub hfsr: u32,
    pub mmfar: u32,
    pub bfar: u32,
    /// Frame pushed on the main stack
    pub msp_frame: HwFrame,
    /// Frame pushed on the process stack
    pub psp_frame: HwFrame,
}

impl Armv7mContext {
    /// The hardware frame holding the real pc, selected by EXC_RETURN
    pub fn frame(&self) -> &HwFrame {
        if self.excret & EXC_RETURN_SPSEL != 0 {
            &self.psp_frame
        } else {
            &self.msp_frame
        }
    }

    pub fn frame_mut(&mut self) -> &mut HwFrame {
        if self.excret & EXC_RETURN_SPSEL != 0 {
            &mut self.psp_frame
        } else {
            &mut self.msp_frame
        }
    }

    /// Exception taken from thread mode
    pub fn from_thread_mode(&self) -> bool {
        self.excret & EXC_RETURN_THREAD != 0
    }
}

impl TrapContext for Armv7mContext {
    fn program_counter(&self) -> usize {
        self.frame().pc as usize
    }

    fn fault_status(&self) -> usize {
        self.cfsr as usize
    }

    fn fault_address(&self) -> usize {
        if Cfsr::from_bits_truncate(self.cfsr).contains(Cfsr::BFARVALID) {
            self.bfar as usize
        } else {
            self.mmfar as usize
        }
    }

    fn is_user_mode(&self) -> bool {
        self.from_thread_mode() && self.control & CONTROL_NPRIV != 0
    }

    fn return_value(&self) -> usize {
        self.frame().r0 as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        let hw = self.frame();
        [
            Register::new32("r0", hw.r0),
            Register::new32("r1", hw.r1),
            Register::new32("r2", hw.r2),
            Register::new32("r3", hw.r3),
        ]
        .into_iter()
        .chain(
            R4_R11_NAMES
                .iter()
                .zip(self.r4_r11.iter())
                .map(|(name, value)| Register::new32(*name, *value)),
        )
        .chain([
            Register::new32("r12", hw.r12),
            Register::new32("psp", self.psp),
            Register::new32("lr", hw.lr),
            Register::new32("pc", hw.pc),
            Register::new32("psr", hw.psr),
            Register::new32("exret", self.excret),
            Register::new32("ctrl", self.control),
            Register::new32("cfsr", self.cfsr),
            Register::new32("hfsr", self.hfsr),
            Register::new32("mmfar", self.mmfar),
            Register::new32("bfar", self.bfar),
        ])
    }
}
