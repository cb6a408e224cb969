//! Numerical building blocks: standardization, distances, least squares.

pub mod distance;
mod lstsq;
mod standardize;

pub use distance::{euclidean_dist, pairwise_euclidean, pearson_dist, Dissimilarity};
pub use lstsq::{lstsq, LstsqSolution};
pub use standardize::Standardizer;
