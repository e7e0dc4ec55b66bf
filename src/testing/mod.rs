// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Testing infrastructure for exception dispatch
//!
//! Provides a recording [`MockPlatform`] standing in for the console, the
//! signal subsystem and the board reset logic.
//!
//! # Usage
//! ```ignore
//! let table = Exceptions::<Aarch64, MockPlatform>::new(MockPlatform::new());
//! table.dispatch(ec::DABT_LOWER, &mut ctx);
//! assert_eq!(table.platform().user_returns(), vec![0]);
//! ```

pub mod platform;

pub use platform::MockPlatform;
