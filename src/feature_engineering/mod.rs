//! Standalone feature encoding
//!
//! An alternative to the trainer's column transformer: roles are inferred
//! from dtypes, text columns are label encoded and the rest standardized.
//! Its artifacts are written for inspection; nothing downstream loads them.

mod encoder;

pub use encoder::{EncodingSummary, FeatureEncoder};
