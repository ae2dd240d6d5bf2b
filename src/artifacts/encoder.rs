use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AppError;

/// Fitted label encoder
///
/// A label's code is its index in the sorted class list, matching how the
/// encoders were fit at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    category: String,
    classes: Vec<String>,
}

/// On-disk form: `{"classes": ["label", ...]}`
#[derive(Debug, Serialize, Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from an already sorted, duplicate-free class list
    pub fn new(category: impl Into<String>, classes: Vec<String>) -> Result<Self, AppError> {
        let category = category.into();

        if classes.is_empty() {
            return Err(AppError::Artifact(format!(
                "{} encoder has no classes",
                category
            )));
        }

        if let Some(pair) = classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AppError::Artifact(format!(
                "{} encoder classes must be sorted and unique ('{}' precedes '{}')",
                category, pair[0], pair[1]
            )));
        }

        Ok(Self { category, classes })
    }

    /// Fit an encoder from arbitrary labels: sort and de-duplicate
    pub fn fit<I, S>(category: impl Into<String>, labels: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self::new(category, classes)
    }

    pub fn from_json(category: impl Into<String>, json: &str) -> Result<Self, AppError> {
        let category = category.into();
        let file: EncoderFile = serde_json::from_str(json).map_err(|e| {
            AppError::Artifact(format!("{} encoder is not valid JSON: {}", category, e))
        })?;
        Self::new(category, file.classes)
    }

    pub fn load(category: impl Into<String>, path: &Path) -> Result<Self, AppError> {
        let category = category.into();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Artifact(format!(
                "cannot read {} encoder at {}: {}",
                category,
                path.display(),
                e
            ))
        })?;
        Self::from_json(category, &json)
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "classes": self.classes }).to_string()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Labels accepted by [`encode`](Self::encode), in code order
    pub fn valid_labels(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Result<u32, AppError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map(|idx| idx as u32)
            .map_err(|_| AppError::unknown_category(&self.category, label))
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
