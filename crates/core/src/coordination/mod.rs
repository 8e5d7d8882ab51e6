// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination primitives shared by concurrently running transactions
//!
//! This module provides:
//! - **ResourceLockManager** - Single-writer-per-resource locks keyed by transaction

pub mod lock;

pub use lock::{LockError, ResourceLockManager};
