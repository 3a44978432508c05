// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// Repository object type names accepted as calculation roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Project,
    Dataset,
    Image,
    Screen,
    Plate,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Project => "Project",
            ObjectKind::Dataset => "Dataset",
            ObjectKind::Image => "Image",
            ObjectKind::Screen => "Screen",
            ObjectKind::Plate => "Plate",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" => Ok(ObjectKind::Project),
            "dataset" => Ok(ObjectKind::Dataset),
            "image" => Ok(ObjectKind::Image),
            "screen" => Ok(ObjectKind::Screen),
            "plate" => Ok(ObjectKind::Plate),
            _ => Err(ParseError::UnknownObjectKind(s.trim().to_string())),
        }
    }
}

/// A `(TypeName, Id)` pair naming one repository object, written `Kind:id`.
///
/// ```
/// use plane_features::model::{ObjectKind, ObjectRef};
///
/// let root: ObjectRef = "Dataset:51".parse().unwrap();
/// assert_eq!(root, ObjectRef::new(ObjectKind::Dataset, 51));
/// assert_eq!(root.to_string(), "Dataset:51");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: i64,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn image(id: i64) -> Self {
        Self::new(ObjectKind::Image, id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for ObjectRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedObjectRef(s.to_string()))?;
        let kind = kind.parse()?;
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|source| ParseError::InvalidObjectId {
                input: s.to_string(),
                source,
            })?;
        Ok(Self { kind, id })
    }
}

impl TryFrom<String> for ObjectRef {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectRef> for String {
    fn from(value: ObjectRef) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitive_kind() {
        let parsed: ObjectRef = "project:3".parse().unwrap();
        assert_eq!(parsed, ObjectRef::new(ObjectKind::Project, 3));

        let parsed: ObjectRef = " IMAGE : 12 ".parse().unwrap();
        assert_eq!(parsed, ObjectRef::image(12));
    }

    #[test]
    fn rejects_malformed_refs() {
        assert_eq!(
            "Dataset".parse::<ObjectRef>(),
            Err(ParseError::MalformedObjectRef("Dataset".into()))
        );
        assert_eq!(
            "Folder:1".parse::<ObjectRef>(),
            Err(ParseError::UnknownObjectKind("Folder".into()))
        );
        match "Image:abc".parse::<ObjectRef>() {
            Err(ParseError::InvalidObjectId { input, .. }) => assert_eq!(input, "Image:abc"),
            other => panic!("expected InvalidObjectId, got {:?}", other),
        }
    }

    #[test]
    fn yaml_error_names_the_bad_root() {
        let err = serde_yaml::from_str::<Vec<ObjectRef>>("[\"Folder:1\"]").unwrap_err();
        assert!(err.to_string().contains("unknown object type 'Folder'"), "{}", err);
    }

    #[test]
    fn deserializes_from_string() {
        let roots: Vec<ObjectRef> = serde_yaml::from_str("[\"Project:1\", \"Image:7\"]").unwrap();
        assert_eq!(roots, vec![ObjectRef::new(ObjectKind::Project, 1), ObjectRef::image(7)]);
    }
}
