// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! IA-32 exception support
//!
//! Trap numbers are IDT vectors. The common stub pushes the debug registers,
//! the general purpose and segment registers, the error code (zero for
//! vectors without one) and CR2 on top of the CPU-pushed interrupt frame.

pub mod faults;

pub use faults::Ia32;

use crate::traits::{Register, TrapContext};

/// IDT vectors
pub mod vector {
    use crate::exception::TrapNumber;

    pub const DIVIDE_ERROR: TrapNumber = 0;
    pub const DEBUG: TrapNumber = 1;
    pub const NMI: TrapNumber = 2;
    pub const BREAKPOINT: TrapNumber = 3;
    pub const OVERFLOW: TrapNumber = 4;
    pub const BOUND_RANGE: TrapNumber = 5;
    pub const INVALID_OP: TrapNumber = 6;
    pub const DEVICE_NA: TrapNumber = 7;
    pub const DOUBLE_FAULT: TrapNumber = 8;
    pub const COPROC_OVERRUN: TrapNumber = 9;
    pub const INVALID_TSS: TrapNumber = 10;
    pub const SEGMENT_NP: TrapNumber = 11;
    pub const STACK_FAULT: TrapNumber = 12;
    pub const GP_FAULT: TrapNumber = 13;
    pub const PAGE_FAULT: TrapNumber = 14;
    pub const X87_FP_ERROR: TrapNumber = 16;
    pub const ALIGNMENT_CHECK: TrapNumber = 17;
    pub const MACHINE_CHECK: TrapNumber = 18;
    pub const SIMD_FP_ERROR: TrapNumber = 19;
    pub const VIRTUALIZATION: TrapNumber = 20;
    pub const CONTROL_PROTECTION: TrapNumber = 21;
    pub const HV_INJECTION: TrapNumber = 28;
    pub const VMM_COMMUNICATION: TrapNumber = 29;
    pub const SECURITY: TrapNumber = 30;
    /// First vector available to external interrupts
    pub const IRQ_BASE: TrapNumber = 32;
    /// `int $0x80` system call gate
    pub const SYSCALL: TrapNumber = 0x80;
}

/// Page fault error code flags
pub mod pf_error {
    /// Page present
    pub const P: u32 = 1 << 0;
    /// Write access
    pub const W: u32 = 1 << 1;
    /// User mode
    pub const U: u32 = 1 << 2;
    /// Reserved bit set
    pub const RSV: u32 = 1 << 3;
    /// Instruction fetch
    pub const I: u32 = 1 << 4;
}

/// Ring 3 code selector
pub const USER_CS: u32 = 0x1b;

/// EFLAGS.VM: virtual-8086 mode
pub const EFLAGS_VM: u32 = 1 << 17;

/// Register state saved by the common exception stub
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ia32Context {
    pub dr0: u32,
    pub dr1: u32,
    pub dr2: u32,
    pub dr3: u32,
    pub dr6: u32,
    pub dr7: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub edx: u32,
    pub ecx: u32,
    pub ebx: u32,
    pub eax: u32,
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    /// Error code, zero for vectors that push none
    pub err: u32,
    pub cr2: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    /// Only pushed on a privilege change
    pub esp: u32,
    pub ss: u32,
}

impl TrapContext for Ia32Context {
    fn program_counter(&self) -> usize {
        self.eip as usize
    }

    fn fault_status(&self) -> usize {
        self.err as usize
    }

    fn fault_address(&self) -> usize {
        self.cr2 as usize
    }

    fn is_user_mode(&self) -> bool {
        self.cs & 3 == 3 || self.eflags & EFLAGS_VM != 0
    }

    fn return_value(&self) -> usize {
        self.eax as usize
    }

    fn registers(&self) -> impl Iterator<Item = Register> + '_ {
        [
            Register::new32("eax", self.eax),
            Register::new32("ebx", self.ebx),
            Register::new32("ecx", self.ecx),
            Register::new32("edx", self.edx),
            Register::new32("esi", self.esi),
            Register::new32("edi", self.edi),
            Register::new32("ebp", self.ebp),
            Register::new32("esp", self.esp),
            Register::new32("eip", self.eip),
            Register::new32("flags", self.eflags),
            Register::new32("err", self.err),
            Register::new32("cr2", self.cr2),
            Register::new32("cs", self.cs),
            Register::new32("ss", self.ss),
            Register::new32("ds", self.ds),
            Register::new32("es", self.es),
            Register::new32("fs", self.fs),
            Register::new32("gs", self.gs),
            Register::new32("dr0", self.dr0),
            Register::new32("dr1", self.dr1),
            Register::new32("dr2", self.dr2),
            Register::new32("dr3", self.dr3),
            Register::new32("dr6", self.dr6),
            Register::new32("dr7", self.dr7),
        ]
        .into_iter()
    }
}
