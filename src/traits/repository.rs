// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Capabilities consumed from an image repository client.
//!
//! The calculator never talks to a concrete client. It only needs to resolve
//! `(kind, id)` roots, list the children of containers, read image dimensions
//! and fetch planes. Anything that provides those through the traits below can
//! back a run: a remote server session, a local archive, or the in-memory
//! backend used by the tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::RepositoryError;
use crate::model::{ImageDimensions, ObjectKind, ObjectRef, Plane};

#[async_trait]
pub trait Repository: Send + Sync {
    /// Resolve an object; `Ok(None)` means the repository has no such object.
    async fn get_object(&self, kind: ObjectKind, id: i64) -> Result<Option<Node>, RepositoryError>;
}

/// A non-image object whose children may be images or further containers.
#[async_trait]
pub trait ContainerHandle: Send + Sync {
    fn object(&self) -> ObjectRef;

    async fn list_children(&self) -> Result<Vec<Node>, RepositoryError>;
}

/// A leaf image.
#[async_trait]
pub trait ImageHandle: Send + Sync {
    fn id(&self) -> i64;

    fn dimensions(&self) -> ImageDimensions;

    async fn get_plane(&self, z: u32, c: u32, t: u32) -> Result<Plane, RepositoryError>;
}

/// One node of the repository hierarchy.
#[derive(Clone)]
pub enum Node {
    Container(Arc<dyn ContainerHandle>),
    Image(Arc<dyn ImageHandle>),
}

impl Node {
    pub fn object(&self) -> ObjectRef {
        match self {
            Node::Container(container) => container.object(),
            Node::Image(image) => ObjectRef::image(image.id()),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Node::Image(_))
    }

    pub fn has_children(&self) -> bool {
        matches!(self, Node::Container(_))
    }

    pub fn as_image(&self) -> Option<&Arc<dyn ImageHandle>> {
        match self {
            Node::Image(image) => Some(image),
            Node::Container(_) => None,
        }
    }

    /// Children in listing order; images have none.
    pub async fn list_children(&self) -> Result<Vec<Node>, RepositoryError> {
        match self {
            Node::Container(container) => container.list_children().await,
            Node::Image(_) => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.object()).finish()
    }
}
