use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AppError;

/// Child index marking a leaf node
const LEAF: i32 = -1;

/// A fitted regressor that maps a feature row to a USD salary
pub trait SalaryModel: Send + Sync + std::fmt::Debug {
    /// Column names, in the order `predict` expects its input
    fn feature_names(&self) -> &[String];

    fn predict(&self, row: &[f64]) -> Result<f64, AppError>;
}

/// One regression tree in flattened array form
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise rows with
/// `x[feature[i]] <= threshold[i]` descend to `children_left[i]` and the rest
/// to `children_right[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i32>,
    pub children_right: Vec<i32>,
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Structural checks; child indices must point forward so traversal terminates
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("node arrays have different lengths".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {} has only a right child", node));
                }
                if !self.value[node].is_finite() {
                    return Err(format!("leaf {} has a non-finite value", node));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i32 || child as usize >= n {
                    return Err(format!("node {} has invalid child index {}", node, child));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {} has a NaN threshold", node));
            }
        }

        Ok(())
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            // Split thresholds were learned on single-precision inputs
            let x = row[self.feature[node] as usize] as f32 as f64;
            node = if x <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Additive ensemble of regression trees:
/// `init_value + learning_rate * sum(tree(x))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingModel {
    feature_names: Vec<String>,
    init_value: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingModel {
    pub fn new(
        feature_names: Vec<String>,
        init_value: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, AppError> {
        let model = Self {
            feature_names,
            init_value,
            learning_rate,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.feature_names.is_empty() {
            return Err(AppError::Artifact("model has no feature names".to_string()));
        }
        if self.trees.is_empty() {
            return Err(AppError::Artifact("model has no trees".to_string()));
        }
        if !self.init_value.is_finite() || !self.learning_rate.is_finite() {
            return Err(AppError::Artifact(
                "model init_value and learning_rate must be finite".to_string(),
            ));
        }

        let n_features = self.feature_names.len();
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|e| AppError::Artifact(format!("tree {}: {}", idx, e)))?;
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| AppError::Artifact(format!("model is not valid JSON: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Artifact(format!("cannot read model at {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::Internal(e.to_string()))
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl SalaryModel for GradientBoostingModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> Result<f64, AppError> {
        if row.len() != self.feature_names.len() {
            return Err(AppError::Prediction(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                row.len()
            )));
        }
        if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
            return Err(AppError::Prediction(format!(
                "feature '{}' is not a finite number",
                self.feature_names[pos]
            )));
        }

        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        let prediction = self.init_value + self.learning_rate * sum;

        if !prediction.is_finite() {
            return Err(AppError::Prediction("model produced a non-finite value".to_string()));
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    /// x0 <= 2.5 → 10, else (x1 <= 0.5 → 20, else 30)
    fn two_level_tree() -> RegressionTree {
        RegressionTree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![2.5, -2.0, 0.5, -2.0, -2.0],
            value: vec![20.0, 10.0, 25.0, 20.0, 30.0],
        }
    }

    #[test]
    fn test_tree_traversal() {
        let tree = two_level_tree();
        assert_eq!(tree.predict(&[1.0, 9.0]), 10.0);
        assert_eq!(tree.predict(&[2.5, 9.0]), 10.0); // equal goes left
        assert_eq!(tree.predict(&[3.0, 0.0]), 20.0);
        assert_eq!(tree.predict(&[3.0, 1.0]), 30.0);
    }

    #[test]
    fn test_ensemble_prediction() {
        let model = GradientBoostingModel::new(
            names(2),
            1000.0,
            0.5,
            vec![two_level_tree(), RegressionTree::leaf(4.0)],
        )
        .unwrap();

        // 1000 + 0.5 * (30 + 4)
        assert_eq!(model.predict(&[5.0, 5.0]).unwrap(), 1017.0);
        assert_eq!(model.tree_count(), 2);
    }

    #[test]
    fn test_wrong_row_length() {
        let model =
            GradientBoostingModel::new(names(2), 0.0, 0.1, vec![RegressionTree::leaf(1.0)]).unwrap();
        let err = model.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }

    #[test]
    fn test_non_finite_input() {
        let model =
            GradientBoostingModel::new(names(2), 0.0, 0.1, vec![RegressionTree::leaf(1.0)]).unwrap();
        let err = model.predict(&[1.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("f1"));
    }

    #[test]
    fn test_backward_child_rejected() {
        let mut tree = two_level_tree();
        tree.children_left[2] = 0;
        let result = GradientBoostingModel::new(names(2), 0.0, 0.1, vec![tree]);
        assert!(matches!(result, Err(AppError::Artifact(_))));
    }

    #[test]
    fn test_unknown_split_feature_rejected() {
        let mut tree = two_level_tree();
        tree.feature[2] = 7;
        assert!(GradientBoostingModel::new(names(2), 0.0, 0.1, vec![tree]).is_err());
    }

    #[test]
    fn test_mismatched_arrays_rejected() {
        let mut tree = two_level_tree();
        tree.value.pop();
        assert!(GradientBoostingModel::new(names(2), 0.0, 0.1, vec![tree]).is_err());
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        assert!(GradientBoostingModel::new(names(2), 0.0, 0.1, vec![]).is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_predictions() {
        let model =
            GradientBoostingModel::new(names(2), 50.0, 0.1, vec![two_level_tree()]).unwrap();
        let restored = GradientBoostingModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_corrupt_json_rejected() {
        let err = GradientBoostingModel::from_json(r#"{"trees": 3}"#).unwrap_err();
        assert!(matches!(err, AppError::Artifact(_)));
    }
}
