pub mod extractor;
pub mod repository;

pub use extractor::{fetch_plane, FeatureExtractor};
pub use repository::{ContainerHandle, ImageHandle, Node, Repository};
