// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod intensity_statistics;
pub mod mean_intensity;

pub use intensity_statistics::*;
pub use mean_intensity::*;

use crate::errors::CalculationError;
use crate::model::Plane;

/// Shared guard: statistics over zero samples are meaningless.
pub(crate) fn require_samples<'a>(
    extractor: &'static str,
    plane: &'a Plane,
) -> Result<&'a [f64], CalculationError> {
    if plane.is_empty() {
        return Err(CalculationError::Extraction {
            extractor,
            message: "plane has no samples".to_string(),
        });
    }
    Ok(plane.samples())
}
