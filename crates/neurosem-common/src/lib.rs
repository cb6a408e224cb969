//! Shared infrastructure for the neurosem workspace.
//!
//! Holds the error taxonomy used by data preparation, model fitting and the
//! cross-validation driver, so every crate reports failures with the same
//! codes and recoverability rules.

pub mod error;

pub use error::{NeurosemError, Result};
