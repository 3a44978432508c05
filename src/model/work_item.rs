// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::PlaneIndex;

/// One computable unit: a single plane of a single image.
///
/// Identity is `(image_id, channel, z, t)`; `width` and `height` travel with
/// the item so extractors can size buffers without another repository call,
/// but they take no part in equality or hashing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorkItem {
    pub image_id: i64,
    pub channel: u32,
    pub z: u32,
    pub t: u32,
    pub width: u32,
    pub height: u32,
}

impl WorkItem {
    pub fn plane(&self) -> PlaneIndex {
        PlaneIndex::new(self.channel, self.z, self.t)
    }

    pub fn key(&self) -> (i64, u32, u32, u32) {
        (self.image_id, self.channel, self.z, self.t)
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for WorkItem {}

impl Hash for WorkItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image {} c={} z={} t={}",
            self.image_id, self.channel, self.z, self.t
        )
    }
}
