// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors reported by repository clients.

use thiserror::Error;

use crate::model::{ObjectRef, PlaneIndex};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The repository could not serve the request at all (connection lost,
    /// session expired, backend refused).
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// A plane index outside the image's dimensions was requested.
    #[error("image {image_id} has no plane c={} z={} t={}", .plane.channel, .plane.z, .plane.t)]
    PlaneOutOfRange { image_id: i64, plane: PlaneIndex },

    /// Listing the children of a container failed.
    #[error("failed to list children of {object}: {reason}")]
    ListingFailed { object: ObjectRef, reason: String },

    /// A repository manifest could not be read or is inconsistent.
    #[error("invalid repository manifest: {0}")]
    Manifest(String),
}
