// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rx-core: Core types for the repository index kernel
//!
//! This crate provides:
//! - Transaction and resource identifiers
//! - The in-process resource lock service

pub mod coordination;
pub mod id;

// Re-exports
pub use coordination::{LockError, ResourceLockManager};
pub use id::{ResourceId, TransactionId};
