// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv7-A fault decoding
//!
//! Short-descriptor fault status: FS[4] lives in bit 10, FS[3:0] in bits
//! 3:0. DFSR.WnR (bit 11) tells a write from a read.

use super::{exc, Armv7aContext};
use crate::exception::dump::{longest, worst_case_len, MAX_DUMP_SIZE};
use crate::exception::{Protection, TrapKind, TrapNumber, MAX_TRAP_COUNT};
use crate::traits::{TrapArch, TrapContext};

/// Fault status register bits
pub mod fsr {
    /// Write not Read (DFSR only)
    pub const WNR: u32 = 1 << 11;
    /// Cache maintenance fault (DFSR only)
    pub const CM: u32 = 1 << 13;

    /// Debug event
    pub const FS_DEBUG: u32 = 0b00010;
    /// Asynchronous external abort
    pub const FS_ASYNC_EXTERNAL: u32 = 0b10110;
    /// Asynchronous parity error on memory access
    pub const FS_ASYNC_PARITY: u32 = 0b11000;
}

/// Five-bit fault status of a DFSR/IFSR value
pub const fn fault_status(fsr: u32) -> u32 {
    ((fsr >> 6) & 0x10) | (fsr & 0xf)
}

/// Whether the matching fault address register holds a valid address
fn far_valid(fsr: u32) -> bool {
    !matches!(
        fault_status(fsr),
        fsr::FS_DEBUG | fsr::FS_ASYNC_EXTERNAL | fsr::FS_ASYNC_PARITY
    )
}

const MNEMONICS: [&str; 8] = [
    "reset",
    "undefined instruction",
    "supervisor call",
    "prefetch abort",
    "data abort",
    "hyp trap",
    "irq",
    "fiq",
];

const UNKNOWN: &str = "unknown";

/// ARMv7-A adapter
pub struct Armv7a;

impl TrapArch for Armv7a {
    type Context = Armv7aContext;

    const NAME: &'static str = "armv7a";
    const TRAP_COUNT: TrapNumber = 8;
    const PAGEFAULT_TRAPS: &'static [TrapNumber] = &[exc::PREFETCH_ABORT, exc::DATA_ABORT];
    const DUMP_SIZE: usize = 512;
    const DUMP_COLUMNS: usize = 4;
    const REGISTER_COUNT: usize = 21;
    const REGISTER_DIGITS: usize = 8;
    const MAX_MNEMONIC_LEN: usize = longest(&MNEMONICS, UNKNOWN);

    fn mnemonic(trap: TrapNumber) -> &'static str {
        MNEMONICS.get(trap as usize).copied().unwrap_or(UNKNOWN)
    }

    fn trap_kind(trap: TrapNumber) -> TrapKind {
        match trap {
            exc::SVC => TrapKind::Software,
            exc::IRQ | exc::FIQ => TrapKind::Interrupt,
            exc::HYP_TRAP => TrapKind::Reserved,
            _ if trap >= Self::TRAP_COUNT => TrapKind::Reserved,
            _ => TrapKind::Fault,
        }
    }

    fn classify_fault(trap: TrapNumber, ctx: &Armv7aContext) -> Protection {
        let mut prot = match trap {
            exc::PREFETCH_ABORT => Protection::EXEC,
            exc::DATA_ABORT if ctx.dfsr & fsr::WNR != 0 && ctx.dfsr & fsr::CM == 0 => {
                Protection::WRITE
            }
            exc::DATA_ABORT => Protection::READ,
            _ => return Protection::empty(),
        };

        if ctx.is_user_mode() {
            prot |= Protection::USER;
        }
        prot
    }

    fn fault_address(trap: TrapNumber, ctx: &Armv7aContext) -> Option<usize> {
        match trap {
            exc::PREFETCH_ABORT if far_valid(ctx.ifsr) => Some(ctx.ifar as usize),
            exc::DATA_ABORT if far_valid(ctx.dfsr) => Some(ctx.dfar as usize),
            _ => None,
        }
    }

    fn fault_status(trap: TrapNumber, ctx: &Armv7aContext) -> usize {
        match trap {
            exc::PREFETCH_ABORT => ctx.ifsr as usize,
            _ => ctx.dfsr as usize,
        }
    }
}

const _: () = assert!(Armv7a::TRAP_COUNT as usize <= MAX_TRAP_COUNT);
const _: () = assert!(Armv7a::DUMP_SIZE <= MAX_DUMP_SIZE);
const _: () = assert!(worst_case_len::<Armv7a>() <= Armv7a::DUMP_SIZE);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::armv7a::{PSR_MODE_SVC, PSR_MODE_USR};
    use crate::exception::dump::assert_dump_bounded;
    use crate::exception::{classify_fault, fault_address, FaultInfo};

    /// Translation fault, page (FS = 0b00111)
    const FS_TRANSLATION_PAGE: u32 = 0b0111;

    #[test]
    fn test_user_write_abort() {
        let ctx = Armv7aContext {
            dfsr: fsr::WNR | FS_TRANSLATION_PAGE,
            dfar: 0x4000_0010,
            cpsr: PSR_MODE_USR,
            ..Default::default()
        };
        assert_eq!(
            classify_fault::<Armv7a>(exc::DATA_ABORT, &ctx),
            Protection::WRITE | Protection::USER
        );
        assert_eq!(fault_address::<Armv7a>(exc::DATA_ABORT, &ctx), Some(0x4000_0010));
    }

    #[test]
    fn test_kernel_read_abort() {
        let ctx = Armv7aContext {
            dfsr: FS_TRANSLATION_PAGE,
            cpsr: PSR_MODE_SVC,
            ..Default::default()
        };
        assert_eq!(classify_fault::<Armv7a>(exc::DATA_ABORT, &ctx), Protection::READ);
    }

    #[test]
    fn test_prefetch_abort_uses_ifar() {
        let ctx = Armv7aContext {
            ifsr: FS_TRANSLATION_PAGE,
            ifar: 0x0001_0000,
            dfar: 0xdead_0000,
            cpsr: PSR_MODE_USR,
            ..Default::default()
        };
        assert_eq!(
            classify_fault::<Armv7a>(exc::PREFETCH_ABORT, &ctx),
            Protection::EXEC | Protection::USER
        );
        assert_eq!(fault_address::<Armv7a>(exc::PREFETCH_ABORT, &ctx), Some(0x0001_0000));
    }

    #[test]
    fn test_status_follows_abort_kind() {
        let ctx = Armv7aContext {
            ifsr: FS_TRANSLATION_PAGE,
            ifar: 0x0001_0000,
            dfsr: fsr::WNR | FS_TRANSLATION_PAGE,
            dfar: 0x4000_0010,
            cpsr: PSR_MODE_USR,
            ..Default::default()
        };

        let info = FaultInfo::collect::<Armv7a>(exc::PREFETCH_ABORT, &ctx).unwrap();
        assert_eq!(info.status, FS_TRANSLATION_PAGE as usize);
        assert_eq!(info.address, Some(0x0001_0000));

        let info = FaultInfo::collect::<Armv7a>(exc::DATA_ABORT, &ctx).unwrap();
        assert_eq!(info.status, (fsr::WNR | FS_TRANSLATION_PAGE) as usize);
        assert_eq!(info.address, Some(0x4000_0010));

        // Raw accessors report the data side
        assert_eq!(ctx.fault_status(), (fsr::WNR | FS_TRANSLATION_PAGE) as usize);
        assert_eq!(ctx.fault_address(), 0x4000_0010);
    }

    #[test]
    fn test_async_abort_has_no_address() {
        // FS[4] is DFSR bit 10
        let ctx = Armv7aContext {
            dfsr: (1 << 10) | 0b0110,
            dfar: 0x1234,
            ..Default::default()
        };
        assert_eq!(fault_status(ctx.dfsr), fsr::FS_ASYNC_EXTERNAL);
        assert_eq!(fault_address::<Armv7a>(exc::DATA_ABORT, &ctx), None);

        let ctx = Armv7aContext {
            ifsr: fsr::FS_DEBUG,
            ..Default::default()
        };
        assert_eq!(fault_address::<Armv7a>(exc::PREFETCH_ABORT, &ctx), None);
    }

    #[test]
    fn test_non_abort_traps() {
        let ctx = Armv7aContext {
            dfsr: fsr::WNR,
            cpsr: PSR_MODE_USR,
            ..Default::default()
        };
        assert_eq!(classify_fault::<Armv7a>(exc::UNDEFINED, &ctx), Protection::empty());
        assert_eq!(fault_address::<Armv7a>(exc::IRQ, &ctx), None);
    }

    #[test]
    fn test_trap_kinds() {
        assert_eq!(Armv7a::trap_kind(exc::SVC), TrapKind::Software);
        assert_eq!(Armv7a::trap_kind(exc::IRQ), TrapKind::Interrupt);
        assert_eq!(Armv7a::trap_kind(exc::DATA_ABORT), TrapKind::Fault);
        assert_eq!(Armv7a::mnemonic(exc::PREFETCH_ABORT), "prefetch abort");
        assert_eq!(Armv7a::mnemonic(9), "unknown");
    }

    #[test]
    fn test_dump_bounded() {
        let ctx = Armv7aContext {
            dfsr: u32::MAX,
            dfar: u32::MAX,
            ifsr: u32::MAX,
            ifar: u32::MAX,
            r: [u32::MAX; 13],
            sp: u32::MAX,
            lr: u32::MAX,
            pc: u32::MAX,
            cpsr: u32::MAX,
        };
        assert_dump_bounded::<Armv7a>(&ctx);
    }
}
