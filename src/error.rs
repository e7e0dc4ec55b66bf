// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Exception core errors

use thiserror::Error;

use crate::exception::TrapNumber;

/// Invalid argument, as returned to C callers
pub const EINVAL: i32 = 22;

/// Errors reported by handler registration
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrapError {
    /// Trap number outside the architecture range
    #[error("invalid trap number {0:#x}")]
    InvalidTrap(TrapNumber),
}

impl TrapError {
    /// Negative error code for the kernel's C-style return convention
    pub const fn errno(&self) -> i32 {
        match self {
            TrapError::InvalidTrap(_) => -EINVAL,
        }
    }
}
