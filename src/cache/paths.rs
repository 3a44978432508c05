// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::config::consts::{PENDING_EXTENSION, RESULT_EXTENSION};
use crate::model::WorkItem;

/// Pending and final locations of one work item's cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPaths {
    /// Lock file that receives the record while it is being written.
    pub pending: PathBuf,
    /// Published result; non-empty once a worker has finished the item.
    pub published: PathBuf,
}

impl EntryPaths {
    pub fn for_item(dir: &Path, item: &WorkItem) -> Self {
        let stem = file_stem(item);
        Self {
            pending: dir.join(format!("{}.{}", stem, PENDING_EXTENSION)),
            published: dir.join(format!("{}.{}", stem, RESULT_EXTENSION)),
        }
    }
}

/// `image<id, 8 digits>-c<channel>-z<z>-t<t>`
pub fn file_stem(item: &WorkItem) -> String {
    format!(
        "image{:08}-c{}-z{}-t{}",
        item.image_id, item.channel, item.z, item.t
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_derived_from_item_identity() {
        let item = WorkItem { image_id: 42, channel: 1, z: 3, t: 0, width: 8, height: 8 };
        let paths = EntryPaths::for_item(Path::new("SmallFeatureSet"), &item);

        assert_eq!(
            paths.pending,
            Path::new("SmallFeatureSet/image00000042-c1-z3-t0.tmp")
        );
        assert_eq!(
            paths.published,
            Path::new("SmallFeatureSet/image00000042-c1-z3-t0.json")
        );

        let resized = WorkItem { width: 1024, height: 1024, ..item };
        assert_eq!(EntryPaths::for_item(Path::new("SmallFeatureSet"), &resized), paths);
    }

    #[test]
    fn long_ids_are_not_truncated() {
        let item = WorkItem { image_id: 1_234_567_890, channel: 0, z: 0, t: 12, width: 1, height: 1 };
        assert_eq!(file_stem(&item), "image1234567890-c0-z0-t12");
    }
}
