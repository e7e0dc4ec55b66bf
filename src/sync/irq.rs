// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt masking guard
//!
//! Disables interrupts on the current core for the lifetime of the guard and
//! restores the previous state on drop. Guards nest: each one restores
//! exactly the state it saved.

use crate::traits::{IrqControl, IrqState};

/// RAII guard for a masked-interrupt section
pub struct IrqGuard<'a, I: IrqControl + ?Sized> {
    ctl: &'a I,
    state: IrqState,
}

impl<'a, I: IrqControl + ?Sized> IrqGuard<'a, I> {
    /// Mask interrupts until the guard is dropped
    pub fn new(ctl: &'a I) -> Self {
        let state = ctl.irq_save();
        Self { ctl, state }
    }

    /// State that will be restored on drop
    pub fn saved_state(&self) -> IrqState {
        self.state
    }
}

impl<'a, I: IrqControl + ?Sized> Drop for IrqGuard<'a, I> {
    fn drop(&mut self) {
        self.ctl.irq_restore(self.state);
    }
}

// ============================================================================
// Tests
// ============================================================================
