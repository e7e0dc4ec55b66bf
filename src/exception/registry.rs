// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Exception handler registry
//!
//! Fixed-size table mapping trap numbers to handlers. Every slot is either
//! explicitly registered or falls back to the default handler, and the
//! default itself is either registered or the built-in fatal handler, so a
//! lookup always resolves to something callable.

use core::fmt;
use core::marker::PhantomData;

use log::{debug, warn};
use spin::Mutex;

use super::{Target, TrapNumber};
use crate::error::TrapError;
use crate::traits::TrapArch;

/// Largest trap number space any adapter may declare
pub const MAX_TRAP_COUNT: usize = 256;

/// Exception handler
///
/// Called with the trap number and the saved context. A handler may modify
/// the context (advance the pc, store a return value) before returning.
pub type TrapHandler<C> = fn(TrapNumber, &mut C);

/// Resolved handler for a trap number
pub enum HandlerRef<C> {
    /// A registered handler
    Handler(TrapHandler<C>),
    /// The built-in fatal handler (dump, then reset or halt)
    Fatal,
}

impl<C> HandlerRef<C> {
    /// Check whether this resolves to the given handler function
    ///
    /// Function addresses are not guaranteed unique, so this is only fit
    /// for test assertions on handlers with distinct bodies.
    #[cfg(test)]
    pub(crate) fn is(&self, handler: TrapHandler<C>) -> bool {
        match self {
            HandlerRef::Handler(h) => *h as usize == handler as usize,
            HandlerRef::Fatal => false,
        }
    }

    /// Check whether this resolves to the built-in fatal handler
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandlerRef::Fatal)
    }
}

impl<C> Clone for HandlerRef<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for HandlerRef<C> {}

impl<C> fmt::Debug for HandlerRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Handler(h) => write!(f, "Handler({:#x})", *h as usize),
            HandlerRef::Fatal => f.write_str("Fatal"),
        }
    }
}

struct Table<C> {
    /// `None` selects the built-in fatal handler
    default: Option<TrapHandler<C>>,
    /// `None` selects the default handler
    slots: [Option<TrapHandler<C>>; MAX_TRAP_COUNT],
}

impl<C> Table<C> {
    const fn new() -> Self {
        Self {
            default: None,
            slots: [None; MAX_TRAP_COUNT],
        }
    }
}

/// Trap number to handler table for one architecture
///
/// Readers (the dispatcher, on every trap) and writers (registration) are
/// serialized by a spinlock held only for a few pointer copies, never across
/// a handler call.
pub struct HandlerRegistry<A: TrapArch> {
    table: Mutex<Table<A::Context>>,
    _arch: PhantomData<fn() -> A>,
}

impl<A: TrapArch> HandlerRegistry<A> {
    /// Create a registry with every slot on the default handler
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(Table::new()),
            _arch: PhantomData,
        }
    }

    /// Reset every slot, and the default, to the built-in fatal handler
    pub fn init(&self) {
        *self.table.lock() = Table::new();
        debug!("{}: exception table reset ({} traps)", A::NAME, A::TRAP_COUNT);
    }

    /// Table index of a hardware trap number
    fn slot_index(trap: TrapNumber) -> Option<usize> {
        let idx = trap as usize;
        (trap < A::TRAP_COUNT && idx < MAX_TRAP_COUNT).then_some(idx)
    }

    /// Install (or clear, with `None`) the handler for a target
    ///
    /// # Errors
    ///
    /// [`TrapError::InvalidTrap`] if a hardware trap number is outside the
    /// architecture range. The table is left untouched in that case.
    pub fn set_handler(
        &self,
        target: Target,
        handler: Option<TrapHandler<A::Context>>,
    ) -> Result<(), TrapError> {
        match target {
            Target::Trap(trap) => {
                let idx = Self::slot_index(trap).ok_or_else(|| {
                    warn!("{}: rejected handler for trap {:#x}", A::NAME, trap);
                    TrapError::InvalidTrap(trap)
                })?;
                self.table.lock().slots[idx] = handler;
            }
            Target::PageFault => {
                let mut table = self.table.lock();
                for idx in A::PAGEFAULT_TRAPS.iter().filter_map(|&t| Self::slot_index(t)) {
                    table.slots[idx] = handler;
                }
            }
            Target::Default => self.table.lock().default = handler,
        }

        debug!(
            "{}: {} handler for {:?}",
            A::NAME,
            if handler.is_some() { "installed" } else { "cleared" },
            target
        );
        Ok(())
    }

    /// Resolve the handler for a trap number
    ///
    /// Out-of-range numbers resolve to the default handler.
    pub fn lookup(&self, trap: TrapNumber) -> HandlerRef<A::Context> {
        let table = self.table.lock();
        let registered = Self::slot_index(trap).and_then(|idx| table.slots[idx]);
        match registered.or(table.default) {
            Some(handler) => HandlerRef::Handler(handler),
            None => HandlerRef::Fatal,
        }
    }
}

impl<A: TrapArch> Default for HandlerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::arm64::{ec, Aarch64, Aarch64Context};
    use crate::arch::ia32::{vector, Ia32, Ia32Context};
    use crate::arch::riscv64::{cause, Riscv64, Riscv64Context};
    use crate::arch::{Armv7a, Armv7aContext, Armv7m, Armv7mContext};
    use crate::arch::{SparcV8Leon, SparcV8LeonContext};

    fn handler_a(_trap: TrapNumber, ctx: &mut Aarch64Context) {
        ctx.x[0] = 0xa;
    }

    fn handler_b(_trap: TrapNumber, ctx: &mut Aarch64Context) {
        ctx.x[0] = 0xb;
    }

    fn vm_fault(_trap: TrapNumber, ctx: &mut Aarch64Context) {
        ctx.x[1] = 0xf;
    }

    fn ia32_fault(_trap: TrapNumber, ctx: &mut Ia32Context) {
        ctx.eax = 0xf;
    }

    fn armv7a_fault(_trap: TrapNumber, ctx: &mut Armv7aContext) {
        ctx.r[0] = 0xa7;
    }

    fn armv7m_fault(_trap: TrapNumber, ctx: &mut Armv7mContext) {
        ctx.r4_r11[0] = 0x37;
    }

    fn riscv64_fault(_trap: TrapNumber, ctx: &mut Riscv64Context) {
        ctx.x[9] = 0x64;
    }

    fn sparc_fault(_trap: TrapNumber, ctx: &mut SparcV8LeonContext) {
        ctx.o[0] = 0x8;
    }

    /// Snapshot of every slot, for "nothing changed" assertions
    fn resolved(registry: &HandlerRegistry<Aarch64>) -> Vec<(bool, usize)> {
        (0..Aarch64::TRAP_COUNT)
            .map(|trap| match registry.lookup(trap) {
                HandlerRef::Handler(h) => (false, h as usize),
                HandlerRef::Fatal => (true, 0),
            })
            .collect()
    }

    #[test]
    fn test_init_every_slot_resolves() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.init();
        for trap in 0..Aarch64::TRAP_COUNT {
            assert!(registry.lookup(trap).is_fatal());
        }

        registry.set_handler(Target::Default, Some(handler_a)).unwrap();
        for trap in 0..Aarch64::TRAP_COUNT {
            assert!(registry.lookup(trap).is(handler_a));
        }
    }

    #[test]
    fn test_last_write_wins() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(Target::Trap(ec::BRK), Some(handler_a)).unwrap();
        registry.set_handler(Target::Trap(ec::BRK), Some(handler_b)).unwrap();

        let resolved = registry.lookup(ec::BRK);
        assert!(resolved.is(handler_b));
        assert!(!resolved.is(handler_a));
    }

    #[test]
    fn test_pagefault_fans_out() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(Target::PageFault, Some(vm_fault)).unwrap();

        for trap in [ec::IABT_LOWER, ec::IABT_CURRENT, ec::DABT_LOWER, ec::DABT_CURRENT] {
            assert!(registry.lookup(trap).is(vm_fault), "trap {:#x}", trap);
        }
        // Nothing outside the group is touched
        assert!(registry.lookup(ec::PC_ALIGN).is_fatal());
        assert!(registry.lookup(ec::SVC64).is_fatal());
    }

    /// Register a page-fault handler and check it lands on exactly the
    /// architecture's abort group
    fn assert_fans_out<A: TrapArch>(handler: TrapHandler<A::Context>) {
        let registry = HandlerRegistry::<A>::new();
        registry.set_handler(Target::PageFault, Some(handler)).unwrap();

        for trap in 0..A::TRAP_COUNT {
            let resolved = registry.lookup(trap);
            if A::PAGEFAULT_TRAPS.contains(&trap) {
                assert!(resolved.is(handler), "{}: trap {:#x}", A::NAME, trap);
            } else {
                assert!(resolved.is_fatal(), "{}: trap {:#x}", A::NAME, trap);
            }
        }
    }

    #[test]
    fn test_pagefault_group_per_architecture() {
        assert_fans_out::<Aarch64>(vm_fault);
        assert_fans_out::<Armv7a>(armv7a_fault);
        assert_fans_out::<Armv7m>(armv7m_fault);
        assert_fans_out::<Ia32>(ia32_fault);
        assert_fans_out::<Riscv64>(riscv64_fault);
        assert_fans_out::<SparcV8Leon>(sparc_fault);

        assert_eq!(Ia32::PAGEFAULT_TRAPS, &[vector::PAGE_FAULT]);
        assert_eq!(
            Riscv64::PAGEFAULT_TRAPS,
            &[cause::FETCH_PAGE_FAULT, cause::LOAD_PAGE_FAULT, cause::STORE_PAGE_FAULT]
        );
    }

    #[test]
    fn test_out_of_range_registration() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(Target::Trap(ec::SVC64), Some(handler_a)).unwrap();
        let before = resolved(&registry);

        let err = registry.set_handler(Target::Trap(Aarch64::TRAP_COUNT), Some(handler_b));
        assert_eq!(err, Err(TrapError::InvalidTrap(Aarch64::TRAP_COUNT)));
        let err = registry.set_handler(Target::Trap(u32::MAX), Some(handler_b));
        assert_eq!(err, Err(TrapError::InvalidTrap(u32::MAX)));

        assert_eq!(resolved(&registry), before);
    }

    #[test]
    fn test_out_of_range_lookup_uses_default() {
        let registry = HandlerRegistry::<Aarch64>::new();
        assert!(registry.lookup(u32::MAX).is_fatal());

        registry.set_handler(Target::Default, Some(handler_b)).unwrap();
        assert!(registry.lookup(Aarch64::TRAP_COUNT).is(handler_b));
        assert!(registry.lookup(u32::MAX).is(handler_b));
    }

    #[test]
    fn test_clear_restores_default() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(Target::Default, Some(handler_a)).unwrap();
        registry.set_handler(ec::BRK.into(), Some(handler_b)).unwrap();
        assert!(registry.lookup(ec::BRK).is(handler_b));

        registry.set_handler(ec::BRK.into(), None).unwrap();
        assert!(registry.lookup(ec::BRK).is(handler_a));

        registry.set_handler(Target::Default, None).unwrap();
        assert!(registry.lookup(ec::BRK).is_fatal());
    }

    #[test]
    fn test_default_does_not_override_explicit_slot() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(ec::BRK.into(), Some(handler_b)).unwrap();
        registry.set_handler(Target::Default, Some(handler_a)).unwrap();

        assert!(registry.lookup(ec::BRK).is(handler_b));
        assert!(registry.lookup(ec::UNKNOWN).is(handler_a));
    }

    #[test]
    fn test_init_clears_registrations() {
        let registry = HandlerRegistry::<Aarch64>::new();
        registry.set_handler(Target::PageFault, Some(vm_fault)).unwrap();
        registry.set_handler(Target::Default, Some(handler_a)).unwrap();

        registry.init();
        assert!(registry.lookup(ec::DABT_LOWER).is_fatal());
        assert!(registry.lookup(ec::UNKNOWN).is_fatal());
    }
}
