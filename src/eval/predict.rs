//! The four prediction variants: two tasks by two methods.

use crate::cv::Fold;
use crate::model::{botastic_predict, EncodingModel};
use crate::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Features → responses
    BrainPrediction,
    /// Responses → features
    MindReading,
}

impl Task {
    pub fn name(self) -> &'static str {
        match self {
            Self::BrainPrediction => "brain_prediction",
            Self::MindReading => "mind_reading",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the prediction is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Fitted OLS coefficients
    EncodingModel,
    /// Distance-weighted extrapolation from training prototypes
    BotasticTemplates,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Self::EncodingModel => "encoding_model",
            Self::BotasticTemplates => "botastic_templates",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actual and predicted vectors for the two held-out items, in the task's target space.
#[derive(Clone, Debug)]
pub struct PredictedPair {
    pub actual: Array2<f64>,
    pub predicted: Array2<f64>,
}

/// One (task, method) combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variant {
    pub task: Task,
    pub method: Method,
}

impl Variant {
    /// All variants in the order their rows are recorded.
    pub const ALL: [Variant; 4] = [
        Variant::new(Task::BrainPrediction, Method::EncodingModel),
        Variant::new(Task::MindReading, Method::EncodingModel),
        Variant::new(Task::BrainPrediction, Method::BotasticTemplates),
        Variant::new(Task::MindReading, Method::BotasticTemplates),
    ];

    pub const fn new(task: Task, method: Method) -> Self {
        Self { task, method }
    }

    /// Predict the held-out pair of `fold`.
    ///
    /// Encoding-model variants reuse the fold's fitted `model`; mind reading
    /// applies the forward coefficients as a decoder rather than fitting an
    /// inverse map.
    pub fn predict(self, fold: &Fold, model: &EncodingModel) -> Result<PredictedPair> {
        let (actual, predicted) = match (self.task, self.method) {
            (Task::BrainPrediction, Method::EncodingModel) => {
                (&fold.test_y, model.predict(fold.test_x.view())?)
            }
            (Task::MindReading, Method::EncodingModel) => {
                (&fold.test_x, model.decode(fold.test_y.view())?)
            }
            (Task::BrainPrediction, Method::BotasticTemplates) => {
                let out = botastic_predict(
                    fold.train_y.view(),
                    fold.train_x.view(),
                    fold.test_x.view(),
                )?;
                (&fold.test_y, out.predicted)
            }
            (Task::MindReading, Method::BotasticTemplates) => {
                let out = botastic_predict(
                    fold.train_x.view(),
                    fold.train_y.view(),
                    fold.test_y.view(),
                )?;
                (&fold.test_x, out.predicted)
            }
        };

        Ok(PredictedPair {
            actual: actual.clone(),
            predicted,
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.task, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::ItemPair;
    use ndarray::{array, Array2};

    fn linear_fold() -> Fold {
        // responses = features · W exactly, so encoding predictions are exact
        let features = array![
            [0.1, 0.9],
            [0.4, 0.2],
            [0.8, 0.5],
            [0.3, 0.3],
            [0.6, 0.7],
            [0.2, 0.1],
            [0.9, 0.8]
        ];
        let w = array![[1.0, -2.0, 0.5], [0.3, 1.0, -1.0]];
        let responses: Array2<f64> = features.dot(&w);
        let pair = ItemPair::new(1, 4).unwrap();
        Fold::split(pair, responses.view(), features.view()).unwrap()
    }

    #[test]
    fn test_variant_order() {
        let names: Vec<String> = Variant::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "brain_prediction/encoding_model",
                "mind_reading/encoding_model",
                "brain_prediction/botastic_templates",
                "mind_reading/botastic_templates",
            ]
        );
    }

    #[test]
    fn test_prediction_shapes_follow_task() {
        let fold = linear_fold();
        let model = EncodingModel::fit(fold.train_x.view(), fold.train_y.view()).unwrap();

        for variant in Variant::ALL {
            let pair = variant.predict(&fold, &model).unwrap();
            assert_eq!(pair.actual.dim(), pair.predicted.dim(), "{variant}");
            let expected_cols = match variant.task {
                Task::BrainPrediction => 3,
                Task::MindReading => 2,
            };
            assert_eq!(pair.predicted.dim(), (2, expected_cols), "{variant}");
        }
    }

    #[test]
    fn test_encoding_brain_prediction_is_exact_for_linear_data() {
        let fold = linear_fold();
        let model = EncodingModel::fit(fold.train_x.view(), fold.train_y.view()).unwrap();
        let pair = Variant::ALL[0].predict(&fold, &model).unwrap();

        for (p, a) in pair.predicted.iter().zip(pair.actual.iter()) {
            assert!((p - a).abs() < 1e-8);
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Task::MindReading).unwrap(), "\"mind_reading\"");
        assert_eq!(
            serde_json::to_string(&Method::BotasticTemplates).unwrap(),
            "\"botastic_templates\""
        );
    }
}
