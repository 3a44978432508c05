// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the crate. Message types follow a struct-based pattern with a `Display`
//! implementation so that:
//!
//! * Log text lives in one place instead of being scattered through the code
//! * Each message carries its fields as structured `tracing` fields as well as text
//! * Call sites stay short: build the message, call `.log()`
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::cache` - Result cache locking, publishing and cleanup events
//! * `messages::calculator` - Calculation run lifecycle and per-item failures
//!
//! # Usage
//!
//! ```rust
//! use plane_features::observability::messages::StructuredLog;
//! use plane_features::observability::messages::calculator::RunStarted;
//!
//! let msg = RunStarted {
//!     extractor: "mean_intensity",
//!     root_count: 2,
//!     category: "SmallFeatureSet",
//! };
//!
//! msg.log();
//! ```

pub mod messages;
