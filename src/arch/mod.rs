// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Architecture adapters
//!
//! Each submodule defines the context snapshot saved by its trap trampoline
//! and implements [`TrapArch`](crate::traits::TrapArch) for a marker type:
//!
//! - **ia32**: IDT vectors, page faults decoded from the error code
//! - **armv7a**: ARM vector table, DFSR/IFSR decoding
//! - **armv7m**: NVIC exception numbers, banked MSP/PSP hardware frames
//! - **arm64**: ESR_EL1 exception classes
//! - **riscv64**: `scause` exception codes
//! - **sparcv8leon**: trap types, SRMMU fault status decoding
//!
//! Adapters are plain data decoding and build on any host, so all of them
//! are always compiled.

pub mod arm64;
pub mod armv7a;
pub mod armv7m;
pub mod ia32;
pub mod riscv64;
pub mod sparcv8leon;

pub use arm64::{Aarch64, Aarch64Context};
pub use armv7a::{Armv7a, Armv7aContext};
pub use armv7m::{Armv7m, Armv7mContext};
pub use ia32::{Ia32, Ia32Context};
pub use riscv64::{Riscv64, Riscv64Context};
pub use sparcv8leon::{SparcV8Leon, SparcV8LeonContext};
