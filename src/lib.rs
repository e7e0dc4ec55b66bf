// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! # Rustux HAL - Exception Dispatch Core
//!
//! Architecture-parameterized exception and trap handling for the Rustux
//! kernel. The assembly trampoline of each architecture saves the interrupted
//! register state into a context snapshot and calls [`Exceptions::dispatch`];
//! everything after that point lives in this crate.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── arch/              # Per-architecture adapters (context layout, fault decoding)
//! │   ├── ia32/
//! │   ├── armv7a/
//! │   ├── armv7m/
//! │   ├── arm64/
//! │   ├── riscv64/
//! │   └── sparcv8leon/
//! ├── exception/         # Generic registry, dispatcher, classifier, dump
//! ├── sync/              # Interrupt masking guard
//! ├── traits.rs          # TrapArch / TrapContext / Platform
//! └── lib.rs             # This file
//! ```
//!
//! ## Adapter Abstraction
//!
//! Each architecture implements [`TrapArch`] for a marker type and
//! [`TrapContext`] for its snapshot struct. The registry, the dispatcher and
//! the formatter only ever talk to those two traits.
//!
//! ## Usage
//!
//! ```ignore
//! use rustux_hal::arch::Aarch64;
//! use rustux_hal::{Exceptions, Target};
//!
//! static EXCEPTIONS: Exceptions<Aarch64, Board> = Exceptions::new(Board);
//!
//! EXCEPTIONS.init();
//! EXCEPTIONS.set_handler(Target::PageFault, Some(vm_fault))?;
//! ```

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod error;
pub mod exception;
pub mod sync;
pub mod traits;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use error::TrapError;
pub use exception::{
    classify_fault, dump_context, fault_address, program_counter, ContextDump, Exceptions,
    FatalPolicy, FaultInfo, HandlerRef, HandlerRegistry, Protection, Target, TrapHandler,
    TrapKind, TrapNumber, FATAL_POLICY,
};
pub use traits::{IrqControl, IrqState, Platform, Register, RegisterWidth, TrapArch, TrapContext};
