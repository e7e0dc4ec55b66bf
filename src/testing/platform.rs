// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Recording platform for tests
//!
//! `reset` and `halt` cannot return, so they record the call and panic;
//! tests observe them through `std::panic::catch_unwind`.

use std::string::String;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::vec::Vec;

use crate::exception::TrapNumber;
use crate::traits::{IrqControl, IrqState, Platform, TrapArch};

/// Platform double recording every call from the exception core
pub struct MockPlatform {
    printed: Mutex<String>,
    user_returns: Mutex<Vec<usize>>,
    coredumps: AtomicUsize,
    resets: AtomicUsize,
    halts: AtomicUsize,
    irq_saves: AtomicUsize,
    irq_depth: AtomicIsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            printed: Mutex::new(String::new()),
            user_returns: Mutex::new(Vec::new()),
            coredumps: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            halts: AtomicUsize::new(0),
            irq_saves: AtomicUsize::new(0),
            irq_depth: AtomicIsize::new(0),
        }
    }

    /// Everything passed to `print_bold` so far
    pub fn printed(&self) -> String {
        self.printed.lock().unwrap().clone()
    }

    /// Return values handed to `setup_user_return`, in call order
    pub fn user_returns(&self) -> Vec<usize> {
        self.user_returns.lock().unwrap().clone()
    }

    pub fn coredumps(&self) -> usize {
        self.coredumps.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn halts(&self) -> usize {
        self.halts.load(Ordering::SeqCst)
    }

    /// Number of masked sections entered
    pub fn irq_saves(&self) -> usize {
        self.irq_saves.load(Ordering::SeqCst)
    }

    /// Currently open masked sections; zero when balanced
    pub fn irq_depth(&self) -> isize {
        self.irq_depth.load(Ordering::SeqCst)
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqControl for MockPlatform {
    fn irq_save(&self) -> IrqState {
        self.irq_saves.fetch_add(1, Ordering::SeqCst);
        let depth = self.irq_depth.fetch_add(1, Ordering::SeqCst);
        IrqState(depth as usize)
    }

    fn irq_restore(&self, _state: IrqState) {
        self.irq_depth.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<A: TrapArch> Platform<A> for MockPlatform {
    fn print_bold(&self, text: &str) {
        self.printed.lock().unwrap().push_str(text);
    }

    fn setup_user_return(&self, retval: usize, _ctx: &mut A::Context) {
        self.user_returns.lock().unwrap().push(retval);
    }

    fn coredump(&self, _trap: TrapNumber, _ctx: &A::Context) {
        self.coredumps.fetch_add(1, Ordering::SeqCst);
    }

    fn reset(&self) -> ! {
        self.resets.fetch_add(1, Ordering::SeqCst);
        panic!("platform reset");
    }

    fn halt(&self) -> ! {
        self.halts.fetch_add(1, Ordering::SeqCst);
        panic!("platform halt");
    }
}
