// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::{ImageDimensions, WorkItem};
use crate::traits::ImageHandle;

/// Expand an image into one work item per plane.
///
/// Order is channel, then z-slice, then time point (time varies fastest).
/// Batch splitting and progress reporting depend on this order being stable.
pub fn enumerate(image: &dyn ImageHandle) -> Vec<WorkItem> {
    enumerate_dimensions(image.id(), image.dimensions())
}

pub fn enumerate_dimensions(image_id: i64, dims: ImageDimensions) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(dims.plane_count());
    for channel in 0..dims.size_c {
        for z in 0..dims.size_z {
            for t in 0..dims.size_t {
                items.push(WorkItem {
                    image_id,
                    channel,
                    z,
                    t,
                    width: dims.size_x,
                    height: dims.size_y,
                });
            }
        }
    }
    items
}
