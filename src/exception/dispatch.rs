// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Exception dispatcher
//!
//! [`Exceptions::dispatch`] is the single entry point the architecture
//! trampoline calls after saving the interrupted context. It looks up the
//! handler, runs it, and on the way back to user mode gives the signal
//! subsystem a chance to interrupt the return path.

use log::trace;

use super::dump::dump_context;
use super::registry::{HandlerRef, HandlerRegistry, TrapHandler};
use super::{Target, TrapNumber};
use crate::error::TrapError;
use crate::sync::IrqGuard;
use crate::traits::{Platform, TrapArch, TrapContext};

/// What the built-in fatal handler does after printing the dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Hardware reset (production builds)
    Reset,
    /// Halt and spin, preserving state for a debugger
    Halt,
}

/// Fatal policy selected at build time by the `halt_on_fatal` feature
pub const FATAL_POLICY: FatalPolicy = if cfg!(feature = "halt_on_fatal") {
    FatalPolicy::Halt
} else {
    FatalPolicy::Reset
};

/// Exception table of one architecture, bound to the platform services
///
/// Usually a `static`:
///
/// ```ignore
/// static EXCEPTIONS: Exceptions<Armv7a, Board> = Exceptions::new(Board);
/// ```
pub struct Exceptions<A: TrapArch, P> {
    registry: HandlerRegistry<A>,
    platform: P,
}

impl<A: TrapArch, P: Platform<A>> Exceptions<A, P> {
    /// Create an exception table with every trap on the fatal handler
    pub const fn new(platform: P) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            platform,
        }
    }

    /// Reset the table, called once at boot
    pub fn init(&self) {
        let _irq = IrqGuard::new(&self.platform);
        self.registry.init();
    }

    /// Install (or clear, with `None`) a handler
    ///
    /// Interrupts are masked on the local core while the table is locked, so
    /// a trap taken on this core cannot spin on the lock held by the code it
    /// interrupted.
    pub fn set_handler(
        &self,
        target: impl Into<Target>,
        handler: Option<TrapHandler<A::Context>>,
    ) -> Result<(), TrapError> {
        let _irq = IrqGuard::new(&self.platform);
        self.registry.set_handler(target.into(), handler)
    }

    /// Resolve the handler currently installed for a trap number
    pub fn lookup(&self, trap: TrapNumber) -> HandlerRef<A::Context> {
        let _irq = IrqGuard::new(&self.platform);
        self.registry.lookup(trap)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Handle a trap
    ///
    /// Out-of-range trap numbers are ignored. After the handler returns, a
    /// trap taken from user mode goes through
    /// [`Platform::setup_user_return`] with the value the handler left in
    /// the return-value register.
    pub fn dispatch(&self, trap: TrapNumber, ctx: &mut A::Context) {
        if trap >= A::TRAP_COUNT {
            trace!("{}: ignoring trap {:#x}", A::NAME, trap);
            return;
        }

        // Trap context: interrupts are already masked by the hardware entry
        match self.registry.lookup(trap) {
            HandlerRef::Handler(handler) => handler(trap, ctx),
            HandlerRef::Fatal => self.fatal(trap, ctx),
        }

        if ctx.is_user_mode() {
            let retval = ctx.return_value();
            self.platform.setup_user_return(retval, ctx);
        }
    }

    /// Handle a trap from the C-ABI trampoline shim
    ///
    /// A null context is ignored.
    ///
    /// # Safety
    ///
    /// `ctx` must be null or point to a valid, exclusively borrowed context
    /// snapshot that outlives the call.
    pub unsafe fn dispatch_raw(&self, trap: TrapNumber, ctx: *mut A::Context) {
        // SAFETY: the caller guarantees ctx is null or valid and unaliased.
        if let Some(ctx) = unsafe { ctx.as_mut() } {
            self.dispatch(trap, ctx);
        }
    }

    /// Built-in fatal handler
    ///
    /// Prints the register dump, optionally hands the snapshot to the
    /// coredump hook, then resets or halts according to [`FATAL_POLICY`].
    pub fn fatal(&self, trap: TrapNumber, ctx: &A::Context) -> ! {
        let dump = dump_context::<A>(ctx, trap);
        self.platform.print_bold(dump.as_str());

        if cfg!(feature = "coredump") {
            self.platform.coredump(trap, ctx);
        }

        match FATAL_POLICY {
            FatalPolicy::Reset => self.platform.reset(),
            FatalPolicy::Halt => self.platform.halt(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
