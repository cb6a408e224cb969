//! Semantic feature ratings: orientation, shuffling and ratings-matrix construction.

use super::responses::ItemInfo;
use crate::{NeurosemError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::warn;

/// Category labels of the canonical item set, in item order.
pub const CANONICAL_CATEGORIES: [&str; 12] = [
    "animal",
    "bodypart",
    "building",
    "buildpart",
    "clothing",
    "furniture",
    "insect",
    "kitchen",
    "manmade",
    "tool",
    "vegetable",
    "vehicle",
];

/// The 60 stimulus items, five per category, grouped by category.
#[rustfmt::skip]
pub const CANONICAL_ITEMS: [&str; 60] = [
    "bear", "cat", "cow", "dog", "horse",
    "arm", "eye", "foot", "hand", "leg",
    "apartment", "barn", "church", "house", "igloo",
    "arch", "chimney", "closet", "door", "window",
    "coat", "dress", "pants", "shirt", "skirt",
    "bed", "chair", "desk", "dresser", "table",
    "ant", "bee", "beetle", "butterfly", "fly",
    "bottle", "cup", "glass", "knife", "spoon",
    "bell", "key", "refrigerator", "telephone", "watch",
    "chisel", "hammer", "pliers", "saw", "screwdriver",
    "carrot", "celery", "corn", "lettuce", "tomato",
    "airplane", "bicycle", "car", "train", "truck",
];

/// Canonical items with their category labels, category ids starting at 1.
pub fn canonical_items() -> Vec<ItemInfo> {
    CANONICAL_ITEMS
        .iter()
        .enumerate()
        .map(|(i, name)| ItemInfo::new(*name, CANONICAL_CATEGORIES[i / 5], i / 5 + 1))
        .collect()
}

/// One rater's scaled rating of one feature for one item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub worker_id: String,
    pub item_name: String,
    pub feature_name: String,
    /// Rating mapped onto [0, 1]
    pub rating_scaled: f64,
}

/// Averaged ratings as delivered; `ratings` may be `items × features` or transposed.
#[derive(Clone, Debug)]
pub struct RawFeatures {
    pub ratings: Array2<f64>,
    pub item_names: Vec<String>,
    pub feature_names: Vec<String>,
}

/// Prepared `items × features` ratings.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    item_names: Vec<String>,
    feature_names: Vec<String>,
}

impl FeatureMatrix {
    pub fn new(
        values: Array2<f64>,
        item_names: Vec<String>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        let expected = vec![item_names.len(), feature_names.len()];
        let actual = vec![values.nrows(), values.ncols()];
        if expected != actual {
            return Err(NeurosemError::shape("feature matrix labels", expected, actual));
        }
        Ok(Self {
            values,
            item_names,
            feature_names,
        })
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn item_names(&self) -> &[String] {
        &self.item_names
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn num_items(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.values.ncols()
    }
}

/// Orient raw ratings as `items × features` and optionally shuffle them.
///
/// With `shuffle` set, each item's feature values are permuted independently,
/// which breaks any correspondence between features and responses.
pub fn prepare_features<R: Rng + ?Sized>(
    raw: &RawFeatures,
    shuffle: bool,
    rng: &mut R,
) -> Result<FeatureMatrix> {
    let items = raw.item_names.len();
    let features = raw.feature_names.len();
    let (rows, cols) = raw.ratings.dim();

    let mut values = if (rows, cols) == (items, features) {
        raw.ratings.clone()
    } else if (rows, cols) == (features, items) {
        raw.ratings.t().to_owned()
    } else {
        return Err(NeurosemError::shape(
            "feature ratings (items x features)",
            vec![items, features],
            vec![rows, cols],
        ));
    };

    let out_of_range = values.iter().filter(|v| !(0.0..=1.0).contains(*v)).count();
    if out_of_range > 0 {
        warn!(count = out_of_range, "feature ratings outside [0, 1]");
    }

    if shuffle {
        for mut row in values.rows_mut() {
            let mut permuted = row.to_vec();
            permuted.shuffle(rng);
            row.assign(&Array1::from(permuted));
        }
    }

    FeatureMatrix::new(values, raw.item_names.clone(), raw.feature_names.clone())
}

/// Average long-format ratings into an `items × features` matrix.
///
/// Features are sorted by name and items follow `item_order`. Every item and
/// feature cell must be rated once by every rater.
pub fn ratings_from_records(records: &[RatingRecord], item_order: &[&str]) -> Result<RawFeatures> {
    if records.is_empty() {
        return Err(NeurosemError::insufficient("no rating records"));
    }

    let raters: BTreeSet<&str> = records.iter().map(|r| r.worker_id.as_str()).collect();
    let feature_names: Vec<&str> = records
        .iter()
        .map(|r| r.feature_name.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rated_items: HashSet<&str> = records.iter().map(|r| r.item_name.as_str()).collect();
    let ordered_items: HashSet<&str> = item_order.iter().copied().collect();
    if rated_items != ordered_items || ordered_items.len() != item_order.len() {
        return Err(NeurosemError::shape(
            "rated items vs item order",
            vec![item_order.len()],
            vec![rated_items.len()],
        ));
    }

    let mut cells: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for record in records {
        let cell = cells
            .entry((record.item_name.as_str(), record.feature_name.as_str()))
            .or_insert((0.0, 0));
        cell.0 += record.rating_scaled;
        cell.1 += 1;
    }

    let mut ratings = Array2::zeros((item_order.len(), feature_names.len()));
    for (i, item) in item_order.iter().enumerate() {
        for (f, feature) in feature_names.iter().enumerate() {
            let (sum, count) = cells.get(&(*item, *feature)).copied().unwrap_or((0.0, 0));
            if count != raters.len() {
                return Err(NeurosemError::insufficient(format!(
                    "expected {} ratings for {item}/{feature}, got {count}",
                    raters.len()
                )));
            }
            ratings[[i, f]] = sum / count as f64;
        }
    }

    Ok(RawFeatures {
        ratings,
        item_names: item_order.iter().map(|s| s.to_string()).collect(),
        feature_names: feature_names.into_iter().map(String::from).collect(),
    })
}
