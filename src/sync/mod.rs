// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Synchronization primitives
//!
//! The handler table itself uses `spin::Mutex`; this module adds the local
//! interrupt masking that must surround it on the writer side.

pub mod irq;

pub use irq::IrqGuard;
