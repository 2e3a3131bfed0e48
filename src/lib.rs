//! Filter-and-aggregate core of the public health surveillance dashboard.
//!
//! The desktop front-end lives in the `health-dashboard` binary; everything it
//! draws is computed here from an immutable [`data::model::StudyTable`].

pub mod config;
pub mod data;
