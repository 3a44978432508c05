// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Channel / z-slice / time-point coordinates of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneIndex {
    pub channel: u32,
    pub z: u32,
    pub t: u32,
}

impl PlaneIndex {
    pub fn new(channel: u32, z: u32, t: u32) -> Self {
        Self { channel, z, t }
    }
}

/// The five image dimensions exposed by a repository image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub size_x: u32,
    pub size_y: u32,
    pub size_c: u32,
    pub size_z: u32,
    pub size_t: u32,
}

impl ImageDimensions {
    pub fn plane_count(&self) -> usize {
        self.size_c as usize * self.size_z as usize * self.size_t as usize
    }

    pub fn contains(&self, plane: PlaneIndex) -> bool {
        plane.channel < self.size_c && plane.z < self.size_z && plane.t < self.size_t
    }

    /// Position of `plane` in channel-major, then z, then time order.
    pub fn plane_offset(&self, plane: PlaneIndex) -> Option<usize> {
        if !self.contains(plane) {
            return None;
        }
        let (c, z, t) = (plane.channel as usize, plane.z as usize, plane.t as usize);
        Some((c * self.size_z as usize + z) * self.size_t as usize + t)
    }
}

/// A single 2D plane of pixel samples, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: u32,
    height: u32,
    samples: Vec<f64>,
}

impl Plane {
    /// Returns `None` when `samples` does not hold exactly `width * height` values.
    pub fn new(width: u32, height: u32, samples: Vec<f64>) -> Option<Self> {
        if samples.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            samples,
        })
    }

    pub fn filled(width: u32, height: u32, value: f64) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_offset_follows_channel_z_time_order() {
        let dims = ImageDimensions {
            size_x: 2,
            size_y: 2,
            size_c: 2,
            size_z: 3,
            size_t: 4,
        };
        assert_eq!(dims.plane_count(), 24);
        assert_eq!(dims.plane_offset(PlaneIndex::new(0, 0, 0)), Some(0));
        assert_eq!(dims.plane_offset(PlaneIndex::new(0, 0, 1)), Some(1));
        assert_eq!(dims.plane_offset(PlaneIndex::new(0, 1, 0)), Some(4));
        assert_eq!(dims.plane_offset(PlaneIndex::new(1, 0, 0)), Some(12));
        assert_eq!(dims.plane_offset(PlaneIndex::new(2, 0, 0)), None);
    }

    #[test]
    fn plane_rejects_wrong_sample_count() {
        assert!(Plane::new(2, 2, vec![1.0; 3]).is_none());
        let plane = Plane::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(plane.get(1, 1), Some(4.0));
        assert_eq!(plane.get(2, 0), None);
    }
}
