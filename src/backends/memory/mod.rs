// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process repository backed by a fixed object graph.
//!
//! Stands in for a remote repository client in tests and in the demo binary.
//! Objects are described by [`MemoryObject`] values, either built in code or
//! loaded from a YAML manifest (see [`manifest`]). Pixel data is synthesized
//! on request from each image's [`PixelSource`].

pub mod manifest;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::RepositoryError;
use crate::model::{ImageDimensions, ObjectKind, ObjectRef, Plane, PlaneIndex};
use crate::traits::{ContainerHandle, ImageHandle, Node, Repository};

/// Where an in-memory image gets its pixels from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PixelSource {
    /// Every sample of every plane has `value`.
    Constant { value: f64 },
    /// Sample `(x, y)` of the plane at offset `p` is `p * width * height + y * width + x`.
    Gradient,
    /// Explicit row-major samples, one entry per plane in channel / z / time order.
    Planes { planes: Vec<Vec<f64>> },
}

impl Default for PixelSource {
    fn default() -> Self {
        PixelSource::Gradient
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemoryImageSpec {
    #[serde(flatten)]
    pub dimensions: ImageDimensions,
    #[serde(default)]
    pub pixels: PixelSource,
}

/// One object of the in-memory hierarchy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemoryObject {
    pub object: ObjectRef,
    #[serde(default)]
    pub children: Vec<ObjectRef>,
    #[serde(default)]
    pub image: Option<MemoryImageSpec>,
}

impl MemoryObject {
    pub fn container(object: ObjectRef, children: Vec<ObjectRef>) -> Self {
        Self {
            object,
            children,
            image: None,
        }
    }

    pub fn image(id: i64, size_x: u32, size_y: u32, size_c: u32, size_z: u32, size_t: u32) -> Self {
        Self {
            object: ObjectRef::image(id),
            children: Vec::new(),
            image: Some(MemoryImageSpec {
                dimensions: ImageDimensions {
                    size_x,
                    size_y,
                    size_c,
                    size_z,
                    size_t,
                },
                pixels: PixelSource::default(),
            }),
        }
    }

    pub fn with_pixels(mut self, pixels: PixelSource) -> Self {
        if let Some(spec) = self.image.as_mut() {
            spec.pixels = pixels;
        }
        self
    }
}

#[derive(Debug, Default)]
struct Store {
    objects: HashMap<ObjectRef, MemoryObject>,
    unavailable: HashSet<ObjectRef>,
}

impl Store {
    fn node(self: &Arc<Self>, object: ObjectRef) -> Option<Node> {
        let entry = self.objects.get(&object)?;
        Some(match &entry.image {
            Some(spec) => Node::Image(Arc::new(MemoryImage {
                id: object.id,
                spec: spec.clone(),
                store: Arc::clone(self),
            })),
            None => Node::Container(Arc::new(MemoryContainer {
                object,
                store: Arc::clone(self),
            })),
        })
    }

    fn check_available(&self, object: ObjectRef) -> Result<(), RepositoryError> {
        if self.unavailable.contains(&object) {
            return Err(RepositoryError::Unavailable(format!(
                "{} is marked unavailable",
                object
            )));
        }
        Ok(())
    }
}

/// A repository whose whole hierarchy lives in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<Store>,
}

impl InMemoryRepository {
    /// Build a repository, checking that every child reference resolves, that
    /// only `Image` objects carry pixel specs and that explicit planes match
    /// their image's dimensions.
    pub fn from_objects(objects: Vec<MemoryObject>) -> Result<Self, RepositoryError> {
        let mut map = HashMap::with_capacity(objects.len());
        for object in objects {
            validate_object(&object)?;
            let key = object.object;
            if map.insert(key, object).is_some() {
                return Err(RepositoryError::Manifest(format!("duplicate object {}", key)));
            }
        }
        for object in map.values() {
            if let Some(missing) = object.children.iter().find(|c| !map.contains_key(c)) {
                return Err(RepositoryError::Manifest(format!(
                    "{} lists unknown child {}",
                    object.object, missing
                )));
            }
        }
        Ok(Self {
            store: Arc::new(Store {
                objects: map,
                unavailable: HashSet::new(),
            }),
        })
    }

    /// Make listing or plane fetches of `object` fail with
    /// [`RepositoryError::Unavailable`]. The object itself still resolves.
    pub fn with_unavailable(self, object: ObjectRef) -> Self {
        let mut unavailable = self.store.unavailable.clone();
        unavailable.insert(object);
        Self {
            store: Arc::new(Store {
                objects: self.store.objects.clone(),
                unavailable,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.store.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.objects.is_empty()
    }
}

fn validate_object(object: &MemoryObject) -> Result<(), RepositoryError> {
    let is_image_kind = object.object.kind == ObjectKind::Image;
    match (&object.image, is_image_kind) {
        (None, true) => {
            return Err(RepositoryError::Manifest(format!(
                "{} has no image dimensions",
                object.object
            )))
        }
        (Some(_), false) => {
            return Err(RepositoryError::Manifest(format!(
                "{} is not an image but has image dimensions",
                object.object
            )))
        }
        _ => {}
    }
    if is_image_kind && !object.children.is_empty() {
        return Err(RepositoryError::Manifest(format!(
            "image {} cannot have children",
            object.object
        )));
    }

    if let Some(MemoryImageSpec {
        dimensions,
        pixels: PixelSource::Planes { planes },
    }) = &object.image
    {
        if planes.len() != dimensions.plane_count() {
            return Err(RepositoryError::Manifest(format!(
                "{} declares {} planes but has {}",
                object.object,
                dimensions.plane_count(),
                planes.len()
            )));
        }
        let samples = dimensions.size_x as usize * dimensions.size_y as usize;
        if let Some(bad) = planes.iter().position(|p| p.len() != samples) {
            return Err(RepositoryError::Manifest(format!(
                "{} plane {} has {} samples, expected {}",
                object.object,
                bad,
                planes[bad].len(),
                samples
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_object(&self, kind: ObjectKind, id: i64) -> Result<Option<Node>, RepositoryError> {
        Ok(self.store.node(ObjectRef::new(kind, id)))
    }
}

struct MemoryContainer {
    object: ObjectRef,
    store: Arc<Store>,
}

#[async_trait]
impl ContainerHandle for MemoryContainer {
    fn object(&self) -> ObjectRef {
        self.object
    }

    async fn list_children(&self) -> Result<Vec<Node>, RepositoryError> {
        self.store.check_available(self.object)?;
        let entry = self
            .store
            .objects
            .get(&self.object)
            .ok_or_else(|| RepositoryError::ListingFailed {
                object: self.object,
                reason: "object no longer exists".to_string(),
            })?;
        entry
            .children
            .iter()
            .map(|child| {
                self.store
                    .node(*child)
                    .ok_or_else(|| RepositoryError::ListingFailed {
                        object: self.object,
                        reason: format!("child {} does not exist", child),
                    })
            })
            .collect()
    }
}

struct MemoryImage {
    id: i64,
    spec: MemoryImageSpec,
    store: Arc<Store>,
}

#[async_trait]
impl ImageHandle for MemoryImage {
    fn id(&self) -> i64 {
        self.id
    }

    fn dimensions(&self) -> ImageDimensions {
        self.spec.dimensions
    }

    async fn get_plane(&self, z: u32, c: u32, t: u32) -> Result<Plane, RepositoryError> {
        self.store.check_available(ObjectRef::image(self.id))?;
        let dims = self.spec.dimensions;
        let index = PlaneIndex::new(c, z, t);
        let offset = dims
            .plane_offset(index)
            .ok_or(RepositoryError::PlaneOutOfRange {
                image_id: self.id,
                plane: index,
            })?;
        let (width, height) = (dims.size_x, dims.size_y);

        let plane = match &self.spec.pixels {
            PixelSource::Constant { value } => Plane::filled(width, height, *value),
            PixelSource::Gradient => {
                let area = width as usize * height as usize;
                let base = offset * area;
                Plane::new(width, height, (0..area).map(|i| (base + i) as f64).collect())
                    .ok_or_else(|| RepositoryError::Manifest("gradient size mismatch".to_string()))?
            }
            PixelSource::Planes { planes } => Plane::new(width, height, planes[offset].clone())
                .ok_or_else(|| {
                    RepositoryError::Manifest(format!(
                        "image {} plane {} has the wrong sample count",
                        self.id, offset
                    ))
                })?,
        };
        Ok(plane)
    }
}
