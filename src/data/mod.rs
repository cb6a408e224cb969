//! Dataset preparation.
//!
//! Raw responses and raw ratings are reduced to the aligned
//! `items × channels` and `items × features` matrices the driver consumes.

mod dataset;
mod features;
mod responses;

pub use dataset::{check_item_order, AnalysisDataset};
pub use features::{
    canonical_items, prepare_features, ratings_from_records, FeatureMatrix, RatingRecord,
    RawFeatures, CANONICAL_CATEGORIES, CANONICAL_ITEMS,
};
pub use responses::{prepare_responses, ItemInfo, RawResponses, ResponseMatrix};
