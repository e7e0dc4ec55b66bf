// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Integration Tests
//!
//! End-to-end exception flows: registration, dispatch, fault decoding and
//! the return-to-user hook, driven through [`crate::Exceptions`] with the
//! recording platform.
