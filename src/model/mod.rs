// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value types shared by enumeration, caching and calculation.

mod object;
mod plane;
mod record;
mod work_item;

pub use object::{ObjectKind, ObjectRef};
pub use plane::{ImageDimensions, Plane, PlaneIndex};
pub use record::ResultRecord;
pub use work_item::WorkItem;
