//! Neural response preparation: replicate averaging, z-scoring, channel selection.

use crate::linalg::Standardizer;
use crate::{NeurosemError, Result};
use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name and category of one stimulus item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub name: String,
    pub category: String,
    pub category_id: usize,
}

impl ItemInfo {
    pub fn new(name: impl Into<String>, category: impl Into<String>, category_id: usize) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            category_id,
        }
    }
}

/// Responses as recorded: `items × channels × replicates`.
#[derive(Clone, Debug)]
pub struct RawResponses {
    pub subject: String,
    pub values: Array3<f64>,
    /// Channel indices, most reliable first, 1-based
    pub reliability_rank: Vec<usize>,
    pub items: Vec<ItemInfo>,
}

impl RawResponses {
    pub fn num_items(&self) -> usize {
        self.values.len_of(Axis(0))
    }

    pub fn num_channels(&self) -> usize {
        self.values.len_of(Axis(1))
    }

    pub fn item_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.name.as_str())
    }
}

/// Prepared `items × channels` responses for one subject.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMatrix {
    subject: String,
    values: Array2<f64>,
    items: Vec<ItemInfo>,
}

impl ResponseMatrix {
    pub fn new(
        subject: impl Into<String>,
        values: Array2<f64>,
        items: Vec<ItemInfo>,
    ) -> Result<Self> {
        if values.nrows() != items.len() {
            return Err(NeurosemError::shape(
                "response rows vs item labels",
                vec![items.len()],
                vec![values.nrows()],
            ));
        }
        Ok(Self {
            subject: subject.into(),
            values,
            items,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn items(&self) -> &[ItemInfo] {
        &self.items
    }

    pub fn num_items(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_channels(&self) -> usize {
        self.values.ncols()
    }
}

/// Reduce raw responses to an `items × channels` matrix.
///
/// Replicates are averaged, each channel is optionally z-scored across items
/// with the sample standard deviation, and the `num_channels` most reliable
/// channels are kept in reliability order. `None` keeps every ranked channel.
pub fn prepare_responses(
    raw: &RawResponses,
    num_channels: Option<usize>,
    zscore: bool,
) -> Result<ResponseMatrix> {
    let (items, channels, replicates) = raw.values.dim();
    if raw.items.len() != items {
        return Err(NeurosemError::shape(
            "raw responses vs item labels",
            vec![raw.items.len()],
            vec![items],
        ));
    }
    if replicates == 0 {
        return Err(NeurosemError::insufficient("raw responses have no replicates"));
    }

    let mut averaged = raw
        .values
        .mean_axis(Axis(2))
        .ok_or_else(|| NeurosemError::insufficient("raw responses have no replicates"))?;

    if zscore {
        let scaler = Standardizer::fit_with_ddof(averaged.view(), 1)?;
        let flat = scaler.flat_columns();
        if flat > 0 {
            warn!(channels = flat, "zero-variance channels map to 0 after z-scoring");
        }
        averaged = scaler.transform(averaged.view())?;
    }

    let keep = match num_channels {
        Some(n) if n > channels => {
            return Err(NeurosemError::insufficient(format!(
                "requested {n} channels but only {channels} are recorded"
            )))
        }
        Some(n) => n,
        None => channels,
    };
    if raw.reliability_rank.len() < keep {
        return Err(NeurosemError::insufficient(format!(
            "reliability ranking lists {} channels, need {keep}",
            raw.reliability_rank.len()
        )));
    }

    let selected = raw.reliability_rank[..keep]
        .iter()
        .map(|&rank| {
            if rank == 0 || rank > channels {
                Err(NeurosemError::insufficient(format!(
                    "reliability rank {rank} is outside 1..={channels}"
                )))
            } else {
                Ok(rank - 1)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    ResponseMatrix::new(
        raw.subject.clone(),
        averaged.select(Axis(1), &selected),
        raw.items.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn raw() -> RawResponses {
        // value = item * 10 + channel + replicate offset (+0 / +2)
        let values = Array3::from_shape_fn((4, 3, 2), |(i, c, r)| {
            (i * 10 + c) as f64 + 2.0 * r as f64
        });
        RawResponses {
            subject: "P1".into(),
            values,
            reliability_rank: vec![3, 1, 2],
            items: (0..4)
                .map(|i| ItemInfo::new(format!("item{i}"), "cat", 0))
                .collect(),
        }
    }

    #[test]
    fn test_averages_replicates_and_selects_by_rank() {
        let prepared = prepare_responses(&raw(), Some(2), false).unwrap();
        assert_eq!(prepared.values().dim(), (4, 2));
        // rank 3 -> channel 2, rank 1 -> channel 0; replicate mean adds 1
        assert_abs_diff_eq!(prepared.values()[[0, 0]], 3.0);
        assert_abs_diff_eq!(prepared.values()[[0, 1]], 1.0);
        assert_abs_diff_eq!(prepared.values()[[3, 0]], 33.0);
        assert_eq!(prepared.subject(), "P1");
        assert_eq!(prepared.items().len(), 4);
    }

    #[test]
    fn test_none_keeps_all_channels() {
        let prepared = prepare_responses(&raw(), None, false).unwrap();
        assert_eq!(prepared.num_channels(), 3);
    }

    #[test]
    fn test_zscore_uses_sample_std() {
        let prepared = prepare_responses(&raw(), Some(3), true).unwrap();
        for col in prepared.values().columns() {
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std(1.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zscore_flat_channel_becomes_zero() {
        let mut data = raw();
        data.values.index_axis_mut(Axis(1), 1).fill(7.0);
        let prepared = prepare_responses(&data, None, true).unwrap();
        // channel 1 sits at position 2 of the ranking
        assert!(prepared.values().column(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zscore_near_flat_channel_becomes_zero() {
        let mut data = raw();
        for (i, mut row) in data.values.index_axis_mut(Axis(1), 0).outer_iter_mut().enumerate() {
            row.fill(5.0 + 1e-14 * i as f64);
        }
        let prepared = prepare_responses(&data, None, true).unwrap();
        // channel 0 sits at position 1 of the ranking
        assert!(prepared.values().column(1).iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_too_many_channels() {
        let err = prepare_responses(&raw(), Some(4), false).unwrap_err();
        assert!(matches!(err, NeurosemError::InsufficientData { .. }));
    }

    #[test]
    fn test_bad_rank() {
        let mut data = raw();
        data.reliability_rank = vec![0, 1, 2];
        assert!(prepare_responses(&data, Some(1), false).is_err());
        data.reliability_rank = vec![4, 1, 2];
        assert!(prepare_responses(&data, Some(1), false).is_err());
    }

    #[test]
    fn test_item_label_count_checked() {
        let mut data = raw();
        data.items.pop();
        assert!(prepare_responses(&data, None, false).unwrap_err().is_shape_mismatch());
    }
}
