// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Context dump formatting
//!
//! Renders a context snapshot into a fixed-size stack buffer for the fatal
//! path, where neither the heap nor the logger can be trusted.
//!
//! # Layout
//!
//! ```text
//! Exception 0x24: data abort from lower EL
//!     x0=0000000000000000    x1=0000000000000000 ...
//! ```
//!
//! One header line, then `DUMP_COLUMNS` registers per line, every value
//! zero-padded to the register width.

use core::fmt::{self, Write};

use super::TrapNumber;
use crate::traits::{TrapArch, TrapContext};

/// Capacity of every dump buffer; adapters declare a smaller limit
pub const MAX_DUMP_SIZE: usize = 1024;

/// Register names are right-aligned to this width
pub const NAME_WIDTH: usize = 5;

/// "Exception " + "0x" and up to 8 digits + ": " + "\n"
const HEADER_FIXED_LEN: usize = 10 + 10 + 2 + 1;

/// Length of one rendered register: " " + name + "=" + value
const fn field_len(digits: usize) -> usize {
    1 + NAME_WIDTH + 1 + digits
}

/// Upper bound of the dump length for an architecture
///
/// Every adapter checks at compile time that this fits its `DUMP_SIZE`.
pub const fn worst_case_len<A: TrapArch>() -> usize {
    let rows = A::REGISTER_COUNT.div_ceil(A::DUMP_COLUMNS);
    let row_len = A::DUMP_COLUMNS * field_len(A::REGISTER_DIGITS) + 1;
    HEADER_FIXED_LEN + A::MAX_MNEMONIC_LEN + rows * row_len
}

/// Length of the longest mnemonic, fallback included
pub const fn longest(strings: &[&str], fallback: &str) -> usize {
    let mut max = fallback.len();
    let mut i = 0;
    while i < strings.len() {
        if strings[i].len() > max {
            max = strings[i].len();
        }
        i += 1;
    }
    max
}

/// Fixed-size text buffer holding a rendered context
///
/// Writes past the limit are cut off and flagged, never stored.
pub struct ContextDump {
    buf: [u8; MAX_DUMP_SIZE],
    len: usize,
    limit: usize,
    truncated: bool,
}

impl ContextDump {
    /// Create an empty buffer accepting at most `limit` bytes
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            buf: [0; MAX_DUMP_SIZE],
            len: 0,
            limit: if limit < MAX_DUMP_SIZE { limit } else { MAX_DUMP_SIZE },
            truncated: false,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Rendered text
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        match core::str::from_utf8(bytes) {
            Ok(text) => text,
            // A cut may split a character; keep the valid prefix
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether some output did not fit
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn render<A: TrapArch>(&mut self, trap: TrapNumber, ctx: &A::Context) -> fmt::Result {
        writeln!(self, "Exception {:#04x}: {}", trap, A::mnemonic(trap))?;

        let mut count = 0;
        for reg in ctx.registers() {
            write!(
                self,
                " {:>name$}={:0digits$x}",
                reg.name,
                reg.value,
                name = NAME_WIDTH,
                digits = reg.width.digits()
            )?;
            count += 1;
            if count % A::DUMP_COLUMNS == 0 {
                self.write_char('\n')?;
            }
        }
        if count % A::DUMP_COLUMNS != 0 {
            self.write_char('\n')?;
        }
        Ok(())
    }
}

impl Write for ContextDump {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let room = self.limit - self.len;
        if bytes.len() > room {
            self.buf[self.len..self.limit].copy_from_slice(&bytes[..room]);
            self.len = self.limit;
            self.truncated = true;
            return Err(fmt::Error);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

impl fmt::Debug for ContextDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextDump")
            .field("text", &self.as_str())
            .field("limit", &self.limit)
            .field("truncated", &self.truncated)
            .finish()
    }
}

/// Render every register of a snapshot plus the trap mnemonic
pub fn dump_context<A: TrapArch>(ctx: &A::Context, trap: TrapNumber) -> ContextDump {
    let mut dump = ContextDump::with_limit(A::DUMP_SIZE);
    // Overflow is recorded in the buffer itself
    let _ = dump.render::<A>(trap, ctx);
    dump
}

/// Check the dump of a saturated snapshot against the declared geometry
#[cfg(test)]
pub(crate) fn assert_dump_bounded<A: TrapArch>(ctx: &A::Context) {
    let registers: Vec<_> = ctx.registers().collect();
    assert_eq!(registers.len(), A::REGISTER_COUNT, "{}: register count", A::NAME);
    for reg in &registers {
        assert!(reg.name.len() <= NAME_WIDTH, "{}: name {}", A::NAME, reg.name);
        assert_eq!(reg.width.digits(), A::REGISTER_DIGITS, "{}: width of {}", A::NAME, reg.name);
    }

    let traps = (0..A::TRAP_COUNT).chain([A::TRAP_COUNT, u32::MAX]);
    for trap in traps {
        assert!(A::mnemonic(trap).len() <= A::MAX_MNEMONIC_LEN, "{}: mnemonic {:#x}", A::NAME, trap);

        let dump = dump_context::<A>(ctx, trap);
        assert!(!dump.is_truncated(), "{}: trap {:#x} truncated", A::NAME, trap);
        assert!(dump.len() <= worst_case_len::<A>());
        assert!(dump.len() <= A::DUMP_SIZE);
    }
}

// ============================================================================
// Tests
// ============================================================================
