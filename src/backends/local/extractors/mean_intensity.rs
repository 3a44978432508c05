use async_trait::async_trait;

use super::require_samples;
use crate::errors::CalculationError;
use crate::model::{PlaneIndex, ResultRecord};
use crate::traits::{fetch_plane, FeatureExtractor, Repository};

/// Minimum, maximum and mean intensity of a plane.
pub struct MeanIntensityExtractor;

impl MeanIntensityExtractor {
    pub const VERSION: &'static str = "0";

    pub fn new() -> Self {
        Self
    }
}

impl Default for MeanIntensityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureExtractor for MeanIntensityExtractor {
    async fn extract(
        &self,
        repository: &dyn Repository,
        image_id: i64,
        plane: PlaneIndex,
    ) -> Result<ResultRecord, CalculationError> {
        let pixels = fetch_plane(repository, image_id, plane).await?;
        let samples = require_samples(self.name(), &pixels)?;

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;

        Ok(ResultRecord::new(
            vec!["min".to_string(), "max".to_string(), "mean".to_string()],
            vec![min, max, mean],
            Self::VERSION,
        )?)
    }

    fn name(&self) -> &'static str {
        "mean_intensity"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::{InMemoryRepository, MemoryObject, PixelSource};

    #[tokio::test]
    async fn computes_min_max_mean() {
        let repo = InMemoryRepository::from_objects(vec![MemoryObject::image(1, 2, 2, 1, 1, 1)
            .with_pixels(PixelSource::Planes {
                planes: vec![vec![1.0, 2.0, 3.0, 6.0]],
            })])
        .unwrap();

        let record = MeanIntensityExtractor::new()
            .extract(&repo, 1, PlaneIndex::new(0, 0, 0))
            .await
            .unwrap();

        assert_eq!(record.names(), &["min", "max", "mean"]);
        assert_eq!(record.values(), &[1.0, 6.0, 3.0]);
        assert_eq!(record.version(), "0");
    }

    #[tokio::test]
    async fn unknown_image_is_image_not_found() {
        let repo = InMemoryRepository::default();
        let err = MeanIntensityExtractor::new()
            .extract(&repo, 404, PlaneIndex::new(0, 0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CalculationError::ImageNotFound { image_id: 404 }));
    }

    #[tokio::test]
    async fn empty_plane_is_an_extraction_error() {
        let repo = InMemoryRepository::from_objects(vec![MemoryObject::image(1, 0, 0, 1, 1, 1)]).unwrap();
        let err = MeanIntensityExtractor::new()
            .extract(&repo, 1, PlaneIndex::new(0, 0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CalculationError::Extraction { extractor: "mean_intensity", .. }));
    }
}
