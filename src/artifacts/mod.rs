//! Model and encoder artifacts, loaded once at startup and immutable afterwards.

pub mod encoder;
pub mod model;

pub use encoder::LabelEncoder;
pub use model::{GradientBoostingModel, RegressionTree, SalaryModel};

use std::sync::Arc;
use tracing::info;

use crate::{config::ArtifactsConfig, error::AppError, features::FEATURE_NAMES};

/// The four categorical encoders the form is built from
#[derive(Debug, Clone)]
pub struct Encoders {
    pub education: LabelEncoder,
    pub employment: LabelEncoder,
    pub dev_type: LabelEncoder,
    pub country: LabelEncoder,
}

impl Encoders {
    pub fn load(config: &ArtifactsConfig) -> Result<Self, AppError> {
        Ok(Self {
            education: LabelEncoder::load("education", &config.education_path())?,
            employment: LabelEncoder::load("employment", &config.employment_path())?,
            dev_type: LabelEncoder::load("developer type", &config.dev_type_path())?,
            country: LabelEncoder::load("country", &config.country_path())?,
        })
    }
}

/// Everything the prediction flow needs from training
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub model: Arc<dyn SalaryModel>,
    pub encoders: Encoders,
}

impl Artifacts {
    /// Pair a model with its encoders, checking the model's column order
    pub fn new(model: Arc<dyn SalaryModel>, encoders: Encoders) -> Result<Self, AppError> {
        let names = model.feature_names();
        if names.len() != FEATURE_NAMES.len() || names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b) {
            return Err(AppError::Artifact(format!(
                "model feature schema {:?} does not match expected {:?}",
                names, FEATURE_NAMES
            )));
        }

        Ok(Self { model, encoders })
    }

    /// Load the model and all four encoders; any failure is fatal to startup
    pub fn load(config: &ArtifactsConfig) -> Result<Self, AppError> {
        let model_path = config.model_path();
        let model = GradientBoostingModel::load(&model_path)?;
        info!(
            path = %model_path.display(),
            trees = model.tree_count(),
            learning_rate = model.learning_rate(),
            "Loaded regression model"
        );

        let encoders = Encoders::load(config)?;
        info!(
            education = encoders.education.len(),
            employment = encoders.employment.len(),
            dev_type = encoders.dev_type.len(),
            country = encoders.country.len(),
            "Loaded label encoders"
        );

        Self::new(Arc::new(model), encoders)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_rejected() {
        let model = GradientBoostingModel::new(
            vec!["Experience".to_string()],
            0.0,
            0.1,
            vec![RegressionTree::leaf(1.0)],
        )
        .unwrap();

        let result = Artifacts::new(Arc::new(model), testing::encoders());
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_missing_files_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactsConfig {
            dir: dir.path().to_path_buf(),
            ..ArtifactsConfig::default()
        };

        let err = Artifacts::load(&config).unwrap_err();
        assert!(err.to_string().contains("best_gb_model.json"));
    }
}
