use std::sync::Arc;

use super::extractors::*;
use crate::errors::ConfigError;
use crate::traits::FeatureExtractor;

/// Factory for creating built-in (in-process) feature extractors
pub struct LocalExtractorFactory;

impl LocalExtractorFactory {
    /// Create an extractor by name
    ///
    /// - "mean_intensity" -> MeanIntensityExtractor (min, max, mean)
    /// - "intensity_statistics" -> IntensityStatisticsExtractor (min, max, mean, stddev, sum)
    pub fn create_extractor(name: &str) -> Result<Arc<dyn FeatureExtractor>, ConfigError> {
        match name {
            "mean_intensity" => Ok(Arc::new(MeanIntensityExtractor::new())),
            "intensity_statistics" => Ok(Arc::new(IntensityStatisticsExtractor::new())),

            // Add more extractors here as they're implemented
            _ => Err(ConfigError::UnknownExtractor {
                name: name.to_string(),
                available: Self::list_available_implementations(),
            }),
        }
    }

    /// List all available extractor names
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec!["mean_intensity", "intensity_statistics"]
    }

    /// Check if an extractor is available
    pub fn is_implementation_available(name: &str) -> bool {
        Self::list_available_implementations().contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_every_listed_extractor() {
        for name in LocalExtractorFactory::list_available_implementations() {
            let extractor = LocalExtractorFactory::create_extractor(name)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", name, e));
            assert_eq!(extractor.name(), name);
            assert!(LocalExtractorFactory::is_implementation_available(name));
        }
    }

    #[test]
    fn unknown_extractor_lists_alternatives() {
        let err = LocalExtractorFactory::create_extractor("wndcharm").err().unwrap();
        let message = err.to_string();
        assert!(message.contains("unknown extractor 'wndcharm'"));
        assert!(message.contains("mean_intensity"));
        assert!(!LocalExtractorFactory::is_implementation_available("wndcharm"));
    }
}
