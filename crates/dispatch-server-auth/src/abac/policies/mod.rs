// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-role access policies.
//!
//! Each module decides for one role after the engine has handled admins, the
//! public catalog and malformed input.

pub mod anonymous;
pub mod demo;
pub mod driver;
pub mod restaurant;
