//! Data quality scoring module.
//!
//! Turns the counts gathered during cleaning and anomaly detection into a
//! single percentage and a presentation band.

mod scorer;

pub use scorer::{QualityLevel, QualityReport, QualityScorer};
