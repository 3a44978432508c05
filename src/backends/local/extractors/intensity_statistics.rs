use async_trait::async_trait;

use super::require_samples;
use crate::errors::CalculationError;
use crate::model::{PlaneIndex, ResultRecord};
use crate::traits::{fetch_plane, FeatureExtractor, Repository};

const FEATURES: [&str; 5] = ["min", "max", "mean", "stddev", "sum"];

/// Intensity summary statistics: min, max, mean, population standard
/// deviation and sum.
pub struct IntensityStatisticsExtractor;

impl IntensityStatisticsExtractor {
    pub const VERSION: &'static str = "1";

    pub fn new() -> Self {
        Self
    }
}

impl Default for IntensityStatisticsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeatureExtractor for IntensityStatisticsExtractor {
    async fn extract(
        &self,
        repository: &dyn Repository,
        image_id: i64,
        plane: PlaneIndex,
    ) -> Result<ResultRecord, CalculationError> {
        let pixels = fetch_plane(repository, image_id, plane).await?;
        let samples = require_samples(self.name(), &pixels)?;

        let n = samples.len() as f64;
        let sum: f64 = samples.iter().sum();
        let mean = sum / n;
        let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(ResultRecord::new(
            FEATURES.iter().map(|s| s.to_string()).collect(),
            vec![min, max, mean, variance.sqrt(), sum],
            Self::VERSION,
        )?)
    }

    fn name(&self) -> &'static str {
        "intensity_statistics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::{InMemoryRepository, MemoryObject, PixelSource};

    #[tokio::test]
    async fn computes_summary_statistics() {
        let repo = InMemoryRepository::from_objects(vec![MemoryObject::image(3, 4, 2, 1, 1, 1)
            .with_pixels(PixelSource::Planes {
                planes: vec![vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]],
            })])
        .unwrap();

        let record = IntensityStatisticsExtractor::new()
            .extract(&repo, 3, PlaneIndex::new(0, 0, 0))
            .await
            .unwrap();

        assert_eq!(record.get("min"), Some(2.0));
        assert_eq!(record.get("max"), Some(9.0));
        assert_eq!(record.get("mean"), Some(5.0));
        assert_eq!(record.get("stddev"), Some(2.0));
        assert_eq!(record.get("sum"), Some(40.0));
    }

    #[tokio::test]
    async fn constant_plane_has_zero_spread() {
        let repo = InMemoryRepository::from_objects(vec![MemoryObject::image(1, 3, 3, 1, 1, 1)
            .with_pixels(PixelSource::Constant { value: 4.5 })])
        .unwrap();

        let record = IntensityStatisticsExtractor::new()
            .extract(&repo, 1, PlaneIndex::new(0, 0, 0))
            .await
            .unwrap();
        assert_eq!(record.get("stddev"), Some(0.0));
        assert_eq!(record.get("sum"), Some(40.5));
    }
}
