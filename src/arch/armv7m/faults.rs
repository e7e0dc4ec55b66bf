// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv7-M fault decoding
//!
//! MemManage and BusFault details come from the Configurable Fault Status
//! Register. The MPU does not report the direction of a plain data access
//! violation, so such faults are reported as both read and write.

use bitflags::bitflags;

use super::{exc, Armv7mContext};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::{TrapArch, TrapContext};

bitflags! {
    /// Bits in the Configurable Fault Status Register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Cfsr: u32 {
        // Bits 0-7: MMFSR (Memory Management Fault Status Register)
        const IACCVIOL = 1 << 0;
        const DACCVIOL = 1 << 1;
        const MUNSTKERR = 1 << 3;
        const MSTKERR = 1 << 4;
        const MLSPERR = 1 << 5;
        const MMARVALID = 1 << 7;

        // Bits 8-15: BFSR (Bus Fault Status Register)
        const IBUSERR = 1 << 8;
        const PRECISERR = 1 << 9;
        const IMPRECISERR = 1 << 10;
        const UNSTKERR = 1 << 11;
        const STKERR = 1 << 12;
        const LSPERR = 1 << 13;
        const BFARVALID = 1 << 15;

        // Bits 16-31: UFSR (Usage Fault Status Register)
        const UNDEFINSTR = 1 << 16;
        const INVSTATE = 1 << 17;
        const INVPC = 1 << 18;
        const NOCP = 1 << 19;
        const UNALIGNED = 1 << 24;
        const DIVBYZERO = 1 << 25;
    }
}

const MNEMONICS: [&str; 16] = [
    "reserved",
    "reset",
    "NMI",
    "hard fault",
    "memmanage fault",
    "bus fault",
    "usage fault",
    "reserved",
    "reserved",
    "reserved",
    "reserved",
    "SVCall",
    "debug monitor",
    "reserved",
    "PendSV",
    "SysTick",
];

const EXTERNAL_IRQ: &str = "external interrupt";

fn mem_manage_access(cfsr: Cfsr) -> Protection {
    if cfsr.contains(Cfsr::IACCVIOL) {
        Protection::EXEC
    } else if cfsr.intersects(Cfsr::MSTKERR | Cfsr::MLSPERR) {
        Protection::WRITE
    } else if cfsr.contains(Cfsr::MUNSTKERR) {
        Protection::READ
    } else {
        Protection::READ | Protection::WRITE
    }
}

fn bus_fault_access(cfsr: Cfsr) -> Protection {
    if cfsr.contains(Cfsr::IBUSERR) {
        Protection::EXEC
    } else if cfsr.intersects(Cfsr::STKERR | Cfsr::LSPERR) {
        Protection::WRITE
    } else if cfsr.contains(Cfsr::UNSTKERR) {
        Protection::READ
    } else {
        Protection::READ | Protection::WRITE
    }
}

/// ARMv7-M adapter
pub struct Armv7m;

impl TrapArch for Armv7m {
    type Context = Armv7mContext;

    const NAME: &'static str = "armv7m";
    const TRAP_COUNT: TrapNumber = 128;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] = &[exc::MEM_MANAGE, exc::BUS_FAULT];
    const DUMP_SIZE: usize = 512;
    const DUMP_COLUMNS: usize = 4;
    const REGISTER_COUNT: usize = 23;
    const REGISTER_DIGITS: usize = 8;
    const MAX_MNEMONIC_LEN: usize = longest(&MNEMONICS, EXTERNAL_IRQ);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        MNEMONICS.get(trap as usize).copied().unwrap_or(EXTERNAL_IRQ)
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        match trap {
            exc::SVCALL => TrapKind::Software,
            exc::NMI | exc::PENDSV | exc::SYSTICK => TrapKind::Interrupt,
            exc::RESET
            | exc::HARD_FAULT
            | exc::MEM_MANAGE
            | exc::BUS_FAULT
            | exc::USAGE_FAULT
            | exc::DEBUG_MONITOR => TrapKind::Fault,
            t if (exc::IRQ0..Self::TRAP_COUNT).contains(&t) => TrapKind::Interrupt,
            _ => TrapKind::Reserved,
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &Armv7mContext) -> Protection {
        let cfsr = Cfsr::from_bits_truncate(ctx.cfsr);
        let mut prot = match trap {
            exc::MEM_MANAGE => mem_manage_access(cfsr),
            exc::BUS_FAULT => bus_fault_access(cfsr),
            _ => return Protection::empty(),
        };

        if ctx.is_user_mode() {
            prot |= Protection::USER;
        }
        prot
    }

    fn fault_address(trap: TrapNumber, ctx: &Armv7mContext) -> Option<usize> {
        let cfsr = Cfsr::from_bits_truncate(ctx.cfsr);
        match trap {
            exc::MEM_MANAGE if cfsr.contains(Cfsr::MMARVALID) => Some(ctx.mmfar as usize),
            exc::BUS_FAULT if cfsr.contains(Cfsr::BFARVALID) => Some(ctx.bfar as usize),
            _ => None,
        }
    }
}

const _: () = assert!(Armv7m::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(Armv7m::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<Armv7m>() <= Armv7m::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::armv7m::{HwFrame, CONTROL_NPRIV, EXC_RETURN_SPSEL, EXC_RETURN_THREAD};
    use crate::exception::dump::assert_dump_bounded;
    use crate::exception::{classify_fault, fault_address, program_counter};

    /// Return to thread mode on the process stack
    const EXC_RETURN_THREAD_PSP: u32 = 0xffff_fffd;
    /// Return to handler mode on the main stack
    const EXC_RETURN_HANDLER_MSP: u32 = 0xffff_fff1;

    fn user_ctx(cfsr: Cfsr) -> Armv7mContext {
        Armv7mContext {
            excret: EXC_RETURN_THREAD_PSP,
            control: CONTROL_NPRIV,
            cfsr: cfsr.bits(),
            mmfar: 0x2000_0100,
            bfar: 0x6000_0000,
            psp_frame: HwFrame {
                pc: 0x0800_0400,
                r0: 7,
                ..Default::default()
            },
            msp_frame: HwFrame {
                pc: 0x0800_f000,
                r0: 9,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_exc_return_bits() {
        assert_ne!(EXC_RETURN_THREAD_PSP & EXC_RETURN_SPSEL, 0);
        assert_ne!(EXC_RETURN_THREAD_PSP & EXC_RETURN_THREAD, 0);
        assert_eq!(EXC_RETURN_HANDLER_MSP & (EXC_RETURN_SPSEL | EXC_RETURN_THREAD), 0);
    }

    #[test]
    fn test_pc_from_process_stack_frame() {
        let ctx = user_ctx(Cfsr::empty());
        assert_eq!(program_counter::<Armv7m>(&ctx), 0x0800_0400);
        assert_eq!(ctx.return_value(), 7);
    }

    #[test]
    fn test_pc_from_main_stack_frame() {
        let mut ctx = user_ctx(Cfsr::empty());
        ctx.excret = EXC_RETURN_HANDLER_MSP;
        assert_eq!(program_counter::<Armv7m>(&ctx), 0x0800_f000);
        assert_eq!(ctx.return_value(), 9);
        assert!(!ctx.is_user_mode());
    }

    #[test]
    fn test_privileged_thread_is_not_user() {
        let mut ctx = user_ctx(Cfsr::empty());
        ctx.control = 0;
        assert!(!ctx.is_user_mode());
    }

    #[test]
    fn test_memmanage_classification() {
        let ctx = user_ctx(Cfsr::IACCVIOL | Cfsr::MMARVALID);
        assert_eq!(
            classify_fault::<Armv7m>(exc::MEM_MANAGE, &ctx),
            Protection::EXEC | Protection::USER
        );
        assert_eq!(fault_address::<Armv7m>(exc::MEM_MANAGE, &ctx), Some(0x2000_0100));

        let ctx = user_ctx(Cfsr::MSTKERR);
        assert_eq!(
            classify_fault::<Armv7m>(exc::MEM_MANAGE, &ctx),
            Protection::WRITE | Protection::USER
        );
        assert_eq!(fault_address::<Armv7m>(exc::MEM_MANAGE, &ctx), None);

        let ctx = user_ctx(Cfsr::DACCVIOL | Cfsr::MMARVALID);
        assert_eq!(
            classify_fault::<Armv7m>(exc::MEM_MANAGE, &ctx),
            Protection::READ | Protection::WRITE | Protection::USER
        );
    }

    #[test]
    fn test_bus_fault_classification() {
        let ctx = user_ctx(Cfsr::PRECISERR | Cfsr::BFARVALID);
        assert_eq!(
            classify_fault::<Armv7m>(exc::BUS_FAULT, &ctx),
            Protection::READ | Protection::WRITE | Protection::USER
        );
        assert_eq!(fault_address::<Armv7m>(exc::BUS_FAULT, &ctx), Some(0x6000_0000));
        assert_eq!(ctx.fault_address(), 0x6000_0000);

        let ctx = user_ctx(Cfsr::UNSTKERR);
        assert_eq!(
            classify_fault::<Armv7m>(exc::BUS_FAULT, &ctx),
            Protection::READ | Protection::USER
        );
        assert_eq!(fault_address::<Armv7m>(exc::BUS_FAULT, &ctx), None);
    }

    #[test]
    fn test_non_abort_traps() {
        let ctx = user_ctx(Cfsr::UNDEFINSTR);
        assert_eq!(classify_fault::<Armv7m>(exc::USAGE_FAULT, &ctx), Protection::empty());
        assert_eq!(fault_address::<Armv7m>(exc::HARD_FAULT, &ctx), None);
    }

    #[test]
    fn test_trap_kinds() {
        assert_eq!(Armv7m::trap_kind(exc::SVCALL), TrapKind::Software);
        assert_eq!(Armv7m::trap_kind(exc::SYSTICK), TrapKind::Interrupt);
        assert_eq!(Armv7m::trap_kind(exc::IRQ0 + 5), TrapKind::Interrupt);
        assert_eq!(Armv7m::trap_kind(exc::BUS_FAULT), TrapKind::Fault);
        assert_eq!(Armv7m::trap_kind(7), TrapKind::Reserved);
        assert_eq!(Armv7m::trap_kind(128), TrapKind::Reserved);
        assert_eq!(Armv7m::mnemonic(exc::IRQ0 + 5), "external interrupt");
    }

    #[test]
    fn test_dump_bounded() {
        let frame = HwFrame {
            r0: u32::MAX,
            r1: u32::MAX,
            r2: u32::MAX,
            r3: u32::MAX,
            r12: u32::MAX,
            lr: u32::MAX,
            pc: u32::MAX,
            psr: u32::MAX,
        };
        let ctx = Armv7mContext {
            psp: u32::MAX,
            r4_r11: [u32::MAX; 8],
            excret: u32::MAX,
            control: u32::MAX,
            cfsr: u32::MAX,
            hfsr: u32::MAX,
            mmfar: u32::MAX,
            bfar: u32::MAX,
            msp_frame: frame,
            psp_frame: frame,
        };
        assert_dump_bounded::<Armv7m>(&ctx);
    }
}
