//! Aligned responses and features for one analysis run.

use super::features::FeatureMatrix;
use super::responses::ResponseMatrix;
use crate::{NeurosemError, Result};

/// Responses and features with identical item order.
#[derive(Clone, Debug)]
pub struct AnalysisDataset {
    responses: ResponseMatrix,
    features: FeatureMatrix,
}

impl AnalysisDataset {
    /// Pair the two matrices, checking item count and order.
    pub fn new(responses: ResponseMatrix, features: FeatureMatrix) -> Result<Self> {
        let response_names = responses.items().iter().map(|item| item.name.as_str());
        check_item_order(response_names, features.item_names().iter().map(String::as_str))?;

        if responses.num_items() < 2 {
            return Err(NeurosemError::insufficient(format!(
                "leave-two-out needs at least 2 items, got {}",
                responses.num_items()
            )));
        }
        Ok(Self {
            responses,
            features,
        })
    }

    pub fn responses(&self) -> &ResponseMatrix {
        &self.responses
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn subject(&self) -> &str {
        self.responses.subject()
    }

    pub fn num_items(&self) -> usize {
        self.responses.num_items()
    }

    pub fn num_channels(&self) -> usize {
        self.responses.num_channels()
    }

    pub fn num_features(&self) -> usize {
        self.features.num_features()
    }
}

/// Fail unless both name sequences have the same length and order.
pub fn check_item_order<'a, 'b>(
    response_items: impl ExactSizeIterator<Item = &'a str>,
    feature_items: impl ExactSizeIterator<Item = &'b str>,
) -> Result<()> {
    if response_items.len() != feature_items.len() {
        return Err(NeurosemError::shape(
            "item count (responses vs features)",
            vec![response_items.len()],
            vec![feature_items.len()],
        ));
    }
    for (index, (response_item, feature_item)) in response_items.zip(feature_items).enumerate() {
        if response_item != feature_item {
            return Err(NeurosemError::ItemOrderMismatch {
                index,
                response_item: response_item.to_string(),
                feature_item: feature_item.to_string(),
            });
        }
    }
    Ok(())
}
