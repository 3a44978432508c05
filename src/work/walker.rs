// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::RepositoryError;
use crate::traits::{ImageHandle, Node};

/// Lazy depth-first flattening of a repository hierarchy into its images.
///
/// Images are yielded in listing order regardless of nesting depth. Children
/// of a container are only listed once the walk reaches it. A failed listing
/// is yielded as an `Err` and the walk resumes with the next sibling.
///
/// The hierarchy is assumed to be acyclic; a cycle makes the walk endless.
pub struct TreeWalker {
    stack: Vec<std::vec::IntoIter<Node>>,
}

impl TreeWalker {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            stack: vec![nodes.into_iter()],
        }
    }

    pub async fn next(&mut self) -> Option<Result<Arc<dyn ImageHandle>, RepositoryError>> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(node) = frame.next() else {
                self.stack.pop();
                continue;
            };
            tracing::debug!(object = %node.object(), "walking repository node");
            match node {
                Node::Image(image) => return Some(Ok(image)),
                Node::Container(container) => match container.list_children().await {
                    Ok(children) => self.stack.push(children.into_iter()),
                    Err(e) => return Some(Err(e)),
                },
            }
        }
    }

    /// Drain the walk, stopping at the first listing error.
    pub async fn collect(mut self) -> Result<Vec<Arc<dyn ImageHandle>>, RepositoryError> {
        let mut images = Vec::new();
        while let Some(image) = self.next().await {
            images.push(image?);
        }
        Ok(images)
    }
}

/// Start a walk over `nodes`. Each call re-walks from the beginning.
pub fn walk(nodes: Vec<Node>) -> TreeWalker {
    TreeWalker::new(nodes)
}
