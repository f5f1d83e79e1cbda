//! Hand landmark service client and sign classifier.
//!
//! Landmark detection runs in a separate service (the detector is not
//! reimplemented here). This crate provides:
//! - [`LandmarkProvider`], the detection seam, and an HTTP implementation
//! - [`Classifier`], the prediction seam, with a random-forest model loaded
//!   from a JSON artifact
//! - [`ClassifierHandle`], the shared, possibly-unavailable model slot

pub mod classifier;
pub mod client;
pub mod error;
pub mod forest;
pub mod provider;
pub mod types;

pub use classifier::{Classifier, ClassifierHandle};
pub use client::{LandmarkClient, LandmarkClientConfig};
pub use error::{MlError, MlResult};
pub use forest::RandomForest;
pub use provider::LandmarkProvider;
pub use types::{HealthResponse, LandmarkResponse};
