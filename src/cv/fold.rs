//! One leave-two-out fold: standardized partitions and item context.

use super::pairs::{ItemPair, LeaveTwoOut};
use crate::data::AnalysisDataset;
use crate::linalg::Standardizer;
use crate::{NeurosemError, Result};
use ndarray::{Array2, ArrayView2, Axis};

/// Standardized train/test partitions for one held-out pair.
///
/// Scalers are fit on the training rows only and applied unchanged to the
/// two test rows. Test row 0 is `pair.item1()`, row 1 is `pair.item2()`.
#[derive(Clone, Debug)]
pub struct Fold {
    pub pair: ItemPair,
    pub train_x: Array2<f64>,
    pub train_y: Array2<f64>,
    pub test_x: Array2<f64>,
    pub test_y: Array2<f64>,
}

impl Fold {
    /// Split `responses` (items × channels) and `features` (items × features) around `pair`.
    pub fn split(
        pair: ItemPair,
        responses: ArrayView2<'_, f64>,
        features: ArrayView2<'_, f64>,
    ) -> Result<Self> {
        let num_items = responses.nrows();
        if features.nrows() != num_items {
            return Err(NeurosemError::shape(
                "fold feature rows",
                vec![num_items],
                vec![features.nrows()],
            ));
        }
        if pair.item2() >= num_items {
            return Err(NeurosemError::insufficient(format!(
                "pair {pair} is out of range for {num_items} items"
            )));
        }

        let (train_idx, test_idx) = LeaveTwoOut::new(num_items).split(pair);

        let train_features = features.select(Axis(0), &train_idx);
        let train_responses = responses.select(Axis(0), &train_idx);
        let (x_scaler, train_x) = Standardizer::fit_transform(train_features.view())?;
        let (y_scaler, train_y) = Standardizer::fit_transform(train_responses.view())?;

        Ok(Self {
            pair,
            train_x,
            train_y,
            test_x: x_scaler.transform(features.select(Axis(0), &test_idx).view())?,
            test_y: y_scaler.transform(responses.select(Axis(0), &test_idx).view())?,
        })
    }

    pub fn num_train(&self) -> usize {
        self.train_x.nrows()
    }
}

/// Labels for the held-out pair, carried into every result row.
#[derive(Clone, Debug, PartialEq)]
pub struct FoldContext {
    pub subject: String,
    pub pair: ItemPair,
    pub item1_name: String,
    pub item2_name: String,
    pub item1_category: String,
    pub item2_category: String,
    pub same_category: bool,
}

impl FoldContext {
    pub fn new(dataset: &AnalysisDataset, pair: ItemPair) -> Self {
        let items = dataset.responses().items();
        let first = &items[pair.item1()];
        let second = &items[pair.item2()];
        Self {
            subject: dataset.responses().subject().to_string(),
            pair,
            item1_name: first.name.clone(),
            item2_name: second.name.clone(),
            item1_category: first.category.clone(),
            item2_category: second.category.clone(),
            same_category: first.category_id == second.category_id,
        }
    }
}
