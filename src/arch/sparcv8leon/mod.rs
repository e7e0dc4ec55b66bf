// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! SPARC V8 (LEON) trap support
//!
//! Trap numbers are the 8-bit trap type (`tt`) from the TBR. The trap
//! window handler flushes the register windows and saves the current
//! window together with the control registers and the SRMMU fault status
//! and fault address registers.

pub mod faults;

pub use faults::{mmu_fsr, SparcV8Leon};

use crate::traits::{Register, TrapContext};

/// Trap types
pub mod tt {
    use crate::exception::TrapNumber;

    pub const RESET: TrapNumber = 0x00;
    pub const INSN_ACCESS_EXCEPTION: TrapNumber = 0x01;
    pub const ILLEGAL_INSN: TrapNumber = 0x02;
    pub const PRIVILEGED_INSN: TrapNumber = 0x03;
    pub const FP_DISABLED: TrapNumber = 0x04;
    pub const WINDOW_OVERFLOW: TrapNumber = 0x05;
    pub const WINDOW_UNDERFLOW: TrapNumber = 0x06;
    pub const MEM_ADDRESS_NOT_ALIGNED: TrapNumber = 0x07;
    pub const FP_EXCEPTION: TrapNumber = 0x08;
    pub const DATA_ACCESS_EXCEPTION: TrapNumber = 0x09;
    pub const TAG_OVERFLOW: TrapNumber = 0x0a;
    pub const WATCHPOINT: TrapNumber = 0x0b;
    /// Interrupt level 1; levels run up to 15 at 0x1f
    pub const INTERRUPT_LEVEL_1: TrapNumber = 0x11;
    pub const INTERRUPT_LEVEL_15: TrapNumber = 0x1f;
    pub const R_REGISTER_ACCESS_ERROR: TrapNumber = 0x20;
    pub const INSN_ACCESS_ERROR: TrapNumber = 0x21;
    pub const CP_DISABLED: TrapNumber = 0x24;
    pub const UNIMPLEMENTED_FLUSH: TrapNumber = 0x25;
    pub const CP_EXCEPTION: TrapNumber = 0x28;
    pub const DATA_ACCESS_ERROR: TrapNumber = 0x29;
    pub const DIVISION_BY_ZERO: TrapNumber = 0x2a;
    pub const DATA_STORE_ERROR: TrapNumber = 0x2b;
    pub const DATA_ACCESS_MMU_MISS: TrapNumber = 0x2c;
    pub const INSN_ACCESS_MMU_MISS: TrapNumber = 0x3c;
    /// First software trap (`ta 0`)
    pub const SOFTWARE_TRAP: TrapNumber = 0x80;
    /// `ta 0x10`, system call
    pub const SYSCALL: TrapNumber = 0x90;
}

/// PSR.PS: supervisor mode before the trap
pub const PSR_PS: u32 = 1 << 6;

static G_NAMES: [&str; 7] = ["g1", "g2", "g3", "g4", "g5", "g6", "g7"];
static O_NAMES: [&str; 8] = ["o0", "o1", "o2", "o3", "o4", "o5", "o6", "o7"];
static L_NAMES: [&str; 8] = ["l0", "l1", "l2", "l3", "l4", "l5", "l6", "l7"];
static I_NAMES: [&str; 8] = ["i0", "i1", "i2", "i3", "i4", "i5", "i6", "i7"];

/// Register state saved by the trap window handler
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SparcV8LeonContext {
    pub psr: u32,
    pub pc: u32,
    pub npc: u32,
    pub y: u32,
    pub wim: u32,
    pub tbr: u32,
    /// g1-g7; g0 reads as zero
    pub g: [u32; 7],
    /// Outs of the trapped window
    pub o: [u32; 8],
    pub l: [u32; 8],
    pub i: [u32; 8],
    /// SRMMU fault status register
    pub mmu_fsr: u32,
    /// SRMMU fault address register
    pub mmu_far: u32,
}

fn bank<'a>(
    names: &'static [&'static str],
    values: &'a [u32],
) -> impl Iterator<Item = Register> + 'a {
    names
        .iter()
        .zip(values.iter())
        .map(|(name, value)| Register::new32(*name, *value))
}

impl TrapContext for SparcV8LeonContext {
    fn program_counter(&self) -> usize {
        self.pc as usize
    }

    fn fault_status(&self) -> usize {
        self.mmu_fsr as usize
    }

    fn fault_address(&self) -> usize {
        self.mmu_far as usize
    }

    fn is_user_mode(&self) -> bool {
        self.psr & PSR_PS == 0
    }

    fn return_value(&self) -> usize {
        self.o[0] as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        [
            Register::new32("psr", self.psr),
            Register::new32("pc", self.pc),
            Register::new32("npc", self.npc),
            Register::new32("y", self.y),
            Register::new32("wim", self.wim),
            Register::new32("tbr", self.tbr),
        ]
        .into_iter()
        .chain(bank(&G_NAMES, &self.g))
        .chain(bank(&O_NAMES, &self.o))
        .chain(bank(&L_NAMES, &self.l))
        .chain(bank(&I_NAMES, &self.i))
        .chain([
            Register::new32("fsr", self.mmu_fsr),
            Register::new32("far", self.mmu_far),
        ])
    }
}
