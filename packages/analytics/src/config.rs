//! Loading [`AnalysisConfig`] from TOML.

use emotion_map_analytics_models::AnalysisConfig;

use crate::AnalyticsError;

pub use emotion_map_analytics_models::config::DEFAULT_CONFIG_TOML;

/// Parses a TOML document into a validated [`AnalysisConfig`].
///
/// Keys missing from the document keep their defaults.
///
/// # Errors
///
/// Returns [`AnalyticsError::Config`] if the TOML is malformed and
/// [`AnalyticsError::Geometry`] if a value is out of range.
pub fn parse_config(text: &str) -> Result<AnalysisConfig, AnalyticsError> {
    let config: AnalysisConfig = toml::de::from_str(text).map_err(|e| AnalyticsError::Config {
        message: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}
