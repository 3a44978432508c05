// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit itself at its designated level with its fields
//! attached.
//!
//! # Organization
//!
//! * `cache` - Result cache locking, publishing and cleanup events
//! * `calculator` - Run lifecycle and per-item outcome events

use tracing::Span;

pub mod cache;
pub mod calculator;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// A span carrying the message's fields, for messages that open a scope.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
