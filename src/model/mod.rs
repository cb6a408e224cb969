//! Per-fold models: the OLS encoding model and distance-based template matching.

mod botastic;
mod encoding;

pub use botastic::{botastic_predict, TemplatePrediction};
pub use encoding::{r2_score, EncodingModel};
