use async_trait::async_trait;

use crate::errors::CalculationError;
use crate::model::{ObjectKind, Plane, PlaneIndex, ResultRecord};
use crate::traits::repository::Repository;

/// Computes a feature vector for a single image plane.
///
/// Extractors receive an image id rather than an image handle so that batch
/// jobs can hand them plain parameter lists. Implementations fetch their own
/// pixels through `repository`, normally via [`fetch_plane`].
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn extract(
        &self,
        repository: &dyn Repository,
        image_id: i64,
        plane: PlaneIndex,
    ) -> Result<ResultRecord, CalculationError>;

    fn name(&self) -> &'static str;
}

/// Resolve `image_id` and fetch one of its planes.
///
/// Fails with [`CalculationError::ImageNotFound`] when the id does not resolve
/// to an image.
pub async fn fetch_plane(
    repository: &dyn Repository,
    image_id: i64,
    plane: PlaneIndex,
) -> Result<Plane, CalculationError> {
    let node = repository
        .get_object(ObjectKind::Image, image_id)
        .await?
        .ok_or(CalculationError::ImageNotFound { image_id })?;
    let image = node
        .as_image()
        .ok_or(CalculationError::ImageNotFound { image_id })?;
    Ok(image.get_plane(plane.z, plane.channel, plane.t).await?)
}
