// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{InMemoryRepository, MemoryObject};
use crate::errors::RepositoryError;

/// YAML description of an in-memory repository.
///
/// # Example
/// ```yaml
/// objects:
///   - object: Project:1
///     children: [Dataset:2]
///   - object: Dataset:2
///     children: [Image:10, Image:11]
///   - object: Image:10
///     image:
///       size_x: 4
///       size_y: 4
///       size_c: 2
///       size_z: 1
///       size_t: 1
///       pixels:
///         source: constant
///         value: 7.0
///   - object: Image:11
///     image: { size_x: 2, size_y: 2, size_c: 1, size_z: 1, size_t: 3 }
/// ```
#[derive(Debug, Deserialize)]
pub struct RepositoryManifest {
    pub objects: Vec<MemoryObject>,
}

impl RepositoryManifest {
    pub fn into_repository(self) -> Result<InMemoryRepository, RepositoryError> {
        InMemoryRepository::from_objects(self.objects)
    }
}

pub fn parse_manifest(yaml: &str) -> Result<InMemoryRepository, RepositoryError> {
    let manifest: RepositoryManifest =
        serde_yaml::from_str(yaml).map_err(|e| RepositoryError::Manifest(e.to_string()))?;
    manifest.into_repository()
}

pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<InMemoryRepository, RepositoryError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| RepositoryError::Manifest(format!("{}: {}", path.display(), e)))?;
    parse_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::PixelSource;
    use crate::model::{ObjectKind, ObjectRef};
    use crate::traits::Repository;

    const MANIFEST: &str = r#"
objects:
  - object: Project:1
    children: [Dataset:2]
  - object: Dataset:2
    children: [Image:10, Image:11]
  - object: Image:10
    image:
      size_x: 4
      size_y: 4
      size_c: 2
      size_z: 1
      size_t: 1
      pixels:
        source: constant
        value: 7.0
  - object: Image:11
    image: { size_x: 1, size_y: 2, size_c: 1, size_z: 1, size_t: 2, pixels: { source: planes, planes: [[1.0, 2.0], [3.0, 4.0]] } }
"#;

    #[test]
    fn parses_manifest_objects() {
        let manifest: RepositoryManifest = serde_yaml::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.objects.len(), 4);
        assert_eq!(manifest.objects[1].children, vec![ObjectRef::image(10), ObjectRef::image(11)]);

        let image = manifest.objects[2].image.as_ref().unwrap();
        assert_eq!(image.dimensions.size_c, 2);
        assert_eq!(image.pixels, PixelSource::Constant { value: 7.0 });
    }

    #[tokio::test]
    async fn manifest_builds_working_repository() {
        let repo = parse_manifest(MANIFEST).unwrap();
        assert_eq!(repo.len(), 4);

        let node = repo.get_object(ObjectKind::Image, 11).await.unwrap().unwrap();
        let image = node.as_image().unwrap();
        let plane = image.get_plane(0, 0, 1).await.unwrap();
        assert_eq!(plane.samples(), &[3.0, 4.0]);
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let err = parse_manifest("objects:\n  - object: Folder:1\n").unwrap_err();
        assert!(matches!(err, RepositoryError::Manifest(_)));
    }

    #[test]
    fn load_manifest_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repository.yaml");
        std::fs::write(&path, MANIFEST).unwrap();
        assert_eq!(load_manifest(&path).unwrap().len(), 4);

        assert!(load_manifest(dir.path().join("missing.yaml")).is_err());
    }
}
